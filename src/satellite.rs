use strum::IntoStaticStr;

/** GOES satellites, identified the way product filenames tag their origin. */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum Satellite {
    #[strum(serialize = "G08")]
    GOES08,
    #[strum(serialize = "G09")]
    GOES09,
    #[strum(serialize = "G10")]
    GOES10,
    #[strum(serialize = "G11")]
    GOES11,
    #[strum(serialize = "G12")]
    GOES12,
    #[strum(serialize = "G13")]
    GOES13,
    #[strum(serialize = "G14")]
    GOES14,
    #[strum(serialize = "G15")]
    GOES15,
    #[strum(serialize = "G16")]
    GOES16,
    #[strum(serialize = "G17")]
    GOES17,
    #[strum(serialize = "G18")]
    GOES18,
}

impl Satellite {
    /// The origin identifier, e.g. "G16".
    pub fn id(self) -> &'static str {
        self.into()
    }

    /// The lowercase archive name, e.g. "goes16", used in bucket names and GridSat filenames.
    pub fn archive_name(self) -> String {
        format!("goes{}", &self.id()[1..])
    }
}

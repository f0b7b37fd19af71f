/// Drawing-level variables read from the DXF HEADER section
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawingHeader {
    /// `$ACADVER`, e.g. "AC1027"
    pub version: Option<String>,
}

impl DrawingHeader {
    /// Human readable release name for the stored version code
    pub fn release_name(&self) -> Option<&'static str> {
        let name = match self.version.as_deref()? {
            "AC1009" => "R12",
            "AC1012" => "R13",
            "AC1014" => "R14",
            "AC1015" => "2000",
            "AC1018" => "2004",
            "AC1021" => "2007",
            "AC1024" => "2010",
            "AC1027" => "2013",
            "AC1032" => "2018",
            _ => return None,
        };
        Some(name)
    }
}

//! Static predefined series sets
//!
//! Each set groups series IDs that are fetched and exported together.

/// A named group of series fetched as one batch
#[derive(Debug, Clone, Copy)]
pub struct SeriesSet {
    /// Unique upper-case name used on the command line
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Series IDs in the set
    pub series_ids: &'static [&'static str],
}

/// Static array of all predefined sets, sorted by name
pub static SERIES_SETS: [SeriesSet; 2] = [
    SeriesSet {
        name: "EMPLOYMENT",
        description: "shows the employment relation between different regions",
        series_ids: &[
            "F032.IMC.IND.Z.Z.EP18.Z.Z.1.M",
            "F074.IPC.VAR.Z.Z.C.M",
            "F019.IPC.V12.10.M",
            "F019.PPB.PRE.100.D",
            "F073.TCO.PRE.Z.D",
            "F049.DES.TAS.INE.10.M",
            "F049.DES.TAS.INE9.26.M",
            "F049.DES.TAS.INE9.12.M",
        ],
    },
    SeriesSet {
        name: "SANKEY",
        description: "shows the sankey evolution",
        series_ids: &[
            // National unemployment, historical and by sex
            "F049.DES.TAS.HIST.10.M",
            "F049.DES.TAS.INE.02.M",
            "F049.DES.TAS.INE.03.M",
            "F049.DES.TAS.INE.10.M",
            // Regional unemployment, new regionalization
            "F049.DES.TAS.INE1.10N.M",
            "F049.DES.TAS.INE1.11N.M",
            "F049.DES.TAS.INE1.12N.M",
            "F049.DES.TAS.INE1.13N.M",
            "F049.DES.TAS.INE1.14N.M",
            "F049.DES.TAS.INE1.15N.M",
            "F049.DES.TAS.INE1.16N.M",
            "F049.DES.TAS.INE1.17N.M",
            "F049.DES.TAS.INE1.18N.M",
            "F049.DES.TAS.INE1.19N.M",
            "F049.DES.TAS.INE1.20N.M",
            "F049.DES.TAS.INE1.21N.M",
            "F049.DES.TAS.INE1.22N.M",
            "F049.DES.TAS.INE1.23N.M",
            "F049.DES.TAS.INE1.24.M",
            "F049.DES.TAS.INE1.25.M",
            // Regional unemployment, INE9
            "F049.DES.TAS.INE9.11.M",
            "F049.DES.TAS.INE9.12.M",
            "F049.DES.TAS.INE9.13.M",
            "F049.DES.TAS.INE9.14.M",
            "F049.DES.TAS.INE9.15.M",
            "F049.DES.TAS.INE9.16.M",
            "F049.DES.TAS.INE9.17.M",
            "F049.DES.TAS.INE9.18.M",
            "F049.DES.TAS.INE9.18N.M",
            "F049.DES.TAS.INE9.19.M",
            "F049.DES.TAS.INE9.20.M",
            "F049.DES.TAS.INE9.21.M",
            "F049.DES.TAS.INE9.22.M",
            "F049.DES.TAS.INE9.23.M",
            "F049.DES.TAS.INE9.24.M",
            "F049.DES.TAS.INE9.25.M",
            "F049.DES.TAS.INE9.26.M",
        ],
    },
];

/// Returns a slice of all predefined sets
pub fn all_sets() -> &'static [SeriesSet] {
    &SERIES_SETS
}

/// Looks up a predefined set by name, ignoring case
pub fn get_set_by_name(name: &str) -> Option<&'static SeriesSet> {
    SERIES_SETS
        .iter()
        .find(|set| set.name.eq_ignore_ascii_case(name.trim()))
}

impl SeriesSet {
    /// Series IDs as owned strings, ready for a batch fetch
    pub fn keys(&self) -> Vec<String> {
        self.series_ids.iter().map(|id| id.to_string()).collect()
    }
}

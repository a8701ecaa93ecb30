//! Static metadata for the supported trace-gas species.
//!
//! The table is read-only configuration: the batch driver uses it to decide
//! which spectral bands to keep for a species. The fitting and evaluation
//! functions never read it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::domain::SpeciesRecord;

/// Metadata of one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesInfo {
    pub name: &'static str,
    /// Alternate (chemical formula) name used by some data sources.
    pub altname: Option<&'static str>,
    /// Name of the species in the RFMIP scenario files.
    pub rfmip: Option<&'static str>,
    /// Fit quality has been checked and the species is in production use.
    pub active: bool,
    /// Wavenumber ranges [cm⁻¹] to keep. Empty means all fitted bands.
    pub arts_bands: &'static [(f64, f64)],
    /// Reference temperature [K].
    pub reftemp: Option<f64>,
    /// Prefer averaged cross-sections over the T/P fit.
    pub use_average: bool,
}

impl SpeciesInfo {
    const fn base(name: &'static str) -> Self {
        Self {
            name,
            altname: None,
            rfmip: None,
            active: false,
            arts_bands: &[],
            reftemp: None,
            use_average: false,
        }
    }
}

static SPECIES_TABLE: &[SpeciesInfo] = &[
    // Bromocarbons, hydrobromocarbons and halons (N2 broadening only)
    SpeciesInfo {
        altname: Some("CBrClF2"),
        rfmip: Some("halon1211_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("Halon-1211")
    },
    SpeciesInfo {
        altname: Some("CBrF3"),
        rfmip: Some("halon1301_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("Halon-1301")
    },
    SpeciesInfo {
        altname: Some("CBrF2CBrF2"),
        rfmip: Some("halon2402_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("Halon-2402")
    },
    // Chlorocarbons and hydrochlorocarbons
    SpeciesInfo {
        active: true,
        arts_bands: &[(700.0, 860.0)],
        rfmip: Some("carbon_tetrachloride_GM"),
        reftemp: Some(250.0),
        ..SpeciesInfo::base("CCl4")
    },
    SpeciesInfo {
        rfmip: Some("ch2cl2_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("CH2Cl2")
    },
    SpeciesInfo {
        rfmip: Some("ch3ccl3_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("CH3CCl3")
    },
    SpeciesInfo {
        arts_bands: &[(580.0, 7200.0)],
        rfmip: Some("chcl3_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("CHCl3")
    },
    // Chlorofluorocarbons
    SpeciesInfo {
        active: true,
        rfmip: Some("cfc11_GM"),
        ..SpeciesInfo::base("CFC-11")
    },
    SpeciesInfo {
        active: true,
        rfmip: Some("cfc12_GM"),
        ..SpeciesInfo::base("CFC-12")
    },
    SpeciesInfo {
        active: true,
        rfmip: Some("cfc113_GM"),
        ..SpeciesInfo::base("CFC-113")
    },
    SpeciesInfo {
        rfmip: Some("cfc114_GM"),
        ..SpeciesInfo::base("CFC-114")
    },
    SpeciesInfo {
        rfmip: Some("cfc115_GM"),
        ..SpeciesInfo::base("CFC-115")
    },
    // Fully fluorinated species
    SpeciesInfo {
        use_average: true,
        arts_bands: &[(500.0, 6500.0)],
        rfmip: Some("c2f6_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("C2F6")
    },
    SpeciesInfo {
        rfmip: Some("c3f8_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("C3F8")
    },
    SpeciesInfo {
        rfmip: Some("c4f10_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("C4F10")
    },
    SpeciesInfo {
        altname: Some("n-C5F12"),
        arts_bands: &[(500.0, 6500.0)],
        rfmip: Some("c5f12_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("C5F12")
    },
    SpeciesInfo {
        altname: Some("n-C6F14"),
        rfmip: Some("c6f14_GM"),
        ..SpeciesInfo::base("C6F14")
    },
    SpeciesInfo {
        rfmip: Some("c8f18_GM"),
        ..SpeciesInfo::base("C8F18")
    },
    SpeciesInfo {
        arts_bands: &[(550.0, 6500.0)],
        rfmip: Some("c_c4f8_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("c-C4F8")
    },
    SpeciesInfo {
        active: true,
        arts_bands: &[(1250.0, 1290.0)],
        rfmip: Some("cf4_GM"),
        ..SpeciesInfo::base("CF4")
    },
    SpeciesInfo {
        rfmip: Some("nf3_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("NF3")
    },
    SpeciesInfo {
        use_average: true,
        arts_bands: &[(560.0, 6500.0)],
        rfmip: Some("sf6_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("SF6")
    },
    SpeciesInfo {
        rfmip: Some("so2f2_GM"),
        reftemp: Some(300.0),
        ..SpeciesInfo::base("SO2F2")
    },
    // Hydrochlorofluorocarbons
    SpeciesInfo {
        rfmip: Some("hcfc141b_GM"),
        ..SpeciesInfo::base("HCFC-141b")
    },
    SpeciesInfo {
        arts_bands: &[(650.0, 1500.0)],
        rfmip: Some("hcfc142b_GM"),
        ..SpeciesInfo::base("HCFC-142b")
    },
    SpeciesInfo {
        use_average: true,
        arts_bands: &[(760.0, 860.0), (1060.0, 1210.0), (1275.0, 1380.0)],
        rfmip: Some("hcfc22_GM"),
        reftemp: Some(210.0),
        ..SpeciesInfo::base("HCFC-22")
    },
    // Hydrofluorocarbons
    SpeciesInfo {
        use_average: true,
        arts_bands: &[(495.0, 1504.0)],
        rfmip: Some("hfc125_GM"),
        ..SpeciesInfo::base("HFC-125")
    },
    SpeciesInfo {
        altname: Some("CFH2CF3"),
        active: true,
        arts_bands: &[(750.0, 1600.0)],
        rfmip: Some("hfc134a_GM"),
        reftemp: Some(220.0),
        ..SpeciesInfo::base("HFC-134a")
    },
    SpeciesInfo {
        use_average: true,
        arts_bands: &[(580.0, 630.0), (694.0, 1504.0)],
        rfmip: Some("hfc143a_GM"),
        ..SpeciesInfo::base("HFC-143a")
    },
    SpeciesInfo {
        rfmip: Some("hfc152a_GM"),
        ..SpeciesInfo::base("HFC-152a")
    },
    SpeciesInfo {
        altname: Some("CF3CHFCF3"),
        arts_bands: &[(500.0, 6500.0)],
        rfmip: Some("hfc227ea_GM"),
        ..SpeciesInfo::base("HFC-227ea")
    },
    SpeciesInfo {
        altname: Some("CF3CH2CF3"),
        rfmip: Some("hfc236fa_GM"),
        ..SpeciesInfo::base("HFC-236fa")
    },
    SpeciesInfo {
        altname: Some("CHF3"),
        rfmip: Some("hfc23_GM"),
        reftemp: Some(230.0),
        ..SpeciesInfo::base("HFC-23")
    },
    SpeciesInfo {
        altname: Some("CHF2CH2CF3"),
        rfmip: Some("hfc245fa_GM"),
        ..SpeciesInfo::base("HFC-245fa")
    },
    SpeciesInfo {
        use_average: true,
        rfmip: Some("hfc32_GM"),
        ..SpeciesInfo::base("HFC-32")
    },
    SpeciesInfo {
        altname: Some("CH3CF2CH2CF3"),
        rfmip: Some("hfc365mfc_GM"),
        ..SpeciesInfo::base("HFC-365mfc")
    },
    SpeciesInfo {
        altname: Some("CF3CHFCHFCF2CF3"),
        rfmip: Some("hfc4310mee_GM"),
        ..SpeciesInfo::base("HFC-43-10mee")
    },
    // Other molecules
    SpeciesInfo {
        rfmip: Some("nitrous_oxide_GM"),
        ..SpeciesInfo::base("N2O")
    },
];

/// Species evaluated against reference line-by-line data.
const REFERENCE_GROUP: &[&str] = &["CCl4", "CF4", "CFC-11", "CFC-12", "HFC-134a", "HFC-23"];

/// RFMIP scenario names, in scenario-file order.
const RFMIP_NAMES: &[&str] = &[
    "c2f6_GM",
    "c3f8_GM",
    "c4f10_GM",
    "c5f12_GM",
    "c6f14_GM",
    "c7f16_GM",
    "c8f18_GM",
    "c_c4f8_GM",
    "carbon_dioxide_GM",
    "carbon_tetrachloride_GM",
    "cf4_GM",
    "cfc113_GM",
    "cfc114_GM",
    "cfc115_GM",
    "cfc11_GM",
    "cfc11eq_GM",
    "cfc12_GM",
    "cfc12eq_GM",
    "ch2cl2_GM",
    "ch3ccl3_GM",
    "chcl3_GM",
    "halon1211_GM",
    "halon1301_GM",
    "halon2402_GM",
    "hcfc141b_GM",
    "hcfc142b_GM",
    "hcfc22_GM",
    "hfc125_GM",
    "hfc134a_GM",
    "hfc134aeq_GM",
    "hfc143a_GM",
    "hfc152a_GM",
    "hfc227ea_GM",
    "hfc236fa_GM",
    "hfc23_GM",
    "hfc245fa_GM",
    "hfc32_GM",
    "hfc365mfc_GM",
    "hfc4310mee_GM",
    "methane_GM",
    "methyl_bromide_GM",
    "methyl_chloride_GM",
    "nf3_GM",
    "sf6_GM",
    "so2f2_GM",
];

static BY_NAME: LazyLock<BTreeMap<&'static str, &'static SpeciesInfo>> =
    LazyLock::new(|| SPECIES_TABLE.iter().map(|s| (s.name, s)).collect());

static BY_RFMIP: LazyLock<BTreeMap<&'static str, &'static SpeciesInfo>> = LazyLock::new(|| {
    SPECIES_TABLE
        .iter()
        .filter_map(|s| s.rfmip.map(|r| (r, s)))
        .collect()
});

/// Look up a species by name.
pub fn species_info(name: &str) -> Option<&'static SpeciesInfo> {
    BY_NAME.get(name).copied()
}

/// Look up a species by its RFMIP scenario name.
pub fn lookup_rfmip(rfmip: &str) -> Option<&'static SpeciesInfo> {
    BY_RFMIP.get(rfmip).copied()
}

/// All species in table order.
pub fn all_species() -> impl Iterator<Item = &'static SpeciesInfo> {
    SPECIES_TABLE.iter()
}

/// Species names of a named group (`reference` or `rfmip`).
///
/// The `rfmip` group lists, in scenario order, every RFMIP name that maps to
/// a species in the table.
pub fn species_group(group: &str) -> Option<Vec<&'static str>> {
    match group {
        "reference" => Some(REFERENCE_GROUP.to_vec()),
        "rfmip" => Some(
            RFMIP_NAMES
                .iter()
                .filter_map(|r| lookup_rfmip(r))
                .map(|s| s.name)
                .collect(),
        ),
        _ => None,
    }
}

/// Length of the overlap of two closed ranges; zero when disjoint.
pub fn band_overlap(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.1.min(b.1) - a.0.max(b.0)).max(0.0)
}

/// Indices of the bands of `record` that overlap any of the species'
/// `arts_bands`. Species without listed bands keep every band.
pub fn select_bands(info: &SpeciesInfo, record: &SpeciesRecord) -> Vec<usize> {
    record
        .bands
        .iter()
        .enumerate()
        .filter(|(_, band)| {
            if info.arts_bands.is_empty() {
                return true;
            }
            band.wavenumber_range().is_some_and(|range| {
                info.arts_bands
                    .iter()
                    .any(|&wanted| band_overlap(range, wanted) > 0.0)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

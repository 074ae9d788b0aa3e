// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Catalog, CatalogError, Category, Lab, LabId, MapPosition, TestOffering};

type OfferingRow = (&'static str, &'static str, &'static str, &'static str);

/// The catalog shipped with the binary: three partner labs in and around
/// Pune and Navi Mumbai, and five browsing categories.
pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(builtin_labs(), builtin_categories())
}

fn lab(
    id: &str,
    name: &str,
    address: &str,
    position: MapPosition,
    certified: bool,
    rows: &[OfferingRow],
) -> Lab {
    Lab {
        id: LabId::from(id),
        name: name.to_owned(),
        address: address.to_owned(),
        position,
        certified,
        offerings: rows
            .iter()
            .map(|(test, price, quantity, turnaround)| {
                (
                    (*test).to_owned(),
                    TestOffering::new(*price, *quantity, *turnaround),
                )
            })
            .collect(),
    }
}

fn category(name: &str, tests: &[&str]) -> Category {
    Category {
        name: name.to_owned(),
        tests: tests.iter().map(|test| (*test).to_owned()).collect(),
    }
}

fn builtin_labs() -> Vec<Lab> {
    vec![
        lab(
            "ncl",
            "National Chemical Laboratory (NCL), Pune",
            "Dr. Homi Bhabha Road, Pune",
            MapPosition::new(45, 40),
            true,
            &[
                ("Optical Microscope RT", "₹1000/sample", "1 sample", "3 days"),
                ("Optical Microscope HT", "₹3000/hour", "1 hour", "3 days"),
                ("Confocal Microscope", "₹10000/sample", "1 sample", "5 days"),
                ("AFM", "₹5000/hour", "1 hour", "7 days"),
                ("SEM (FESEM)", "₹7000/sample", "30 mg", "10 days"),
                ("SEM (SEM+EDX)", "₹9000/sample", "30 mg", "10 days"),
                ("SEM (SEM+EDX+Mapping)", "₹12000/sample", "30 mg", "10 days"),
                ("SEM High Vacuum", "₹4000/sample", "30 mg", "8 days"),
                ("SEM High Vacuum + EDX", "₹6000/sample", "30 mg", "8 days"),
                ("SEM High Vacuum + Mapping", "₹7000/sample", "30 mg", "8 days"),
                ("SEM Low Vacuum", "₹5000/sample", "30 mg", "8 days"),
                ("Gas Chromatography", "₹750/sample", "50 mg", "5 days"),
                ("GC-MS (30 min run)", "₹3000/sample", "50 mg", "8 days"),
                ("GC-MS (50 min run)", "₹5000/sample", "50 mg", "8 days"),
                ("High Temp GPC", "₹20000/sample", "1 g", "8 days"),
                ("GPC (CHCl3, THF)", "₹9000/sample", "1 g", "8 days"),
                ("Aqueous GPC", "₹7500/sample", "1 g", "8 days"),
                ("UPLC", "₹2000/sample", "50 mg", "5 days"),
                ("HPLC (UV, UV-RI)", "₹1000/sample", "50 mg", "5 days"),
                ("UV-Vis (Liquid)", "₹1000/sample", "0.5 ml", "3 days"),
                ("UV-Vis (Solid)", "₹3000/sample", "20 mg", "3 days"),
                ("UV-Vis-NIR (Liquid)", "₹2500/sample", "0.5 ml", "5 days"),
                ("UV-Vis-NIR (Solid)", "₹5000/sample", "20 mg", "5 days"),
                ("FTIR", "₹1000/sample", "20 mg", "3 days"),
                ("Fluorescence Spectrometer", "₹1500/sample", "0.5 ml", "5 days"),
                ("CD Spectrophotometer", "₹2500/sample", "0.5 ml", "7 days"),
                ("Raman Spectroscopy (Regular)", "₹2000/sample", "50 mg", "7 days"),
                ("Raman Spectroscopy (Low Temp/HT)", "₹5000/sample", "50 mg", "10 days"),
            ],
        ),
        lab(
            "diya",
            "DIYA Labs",
            "Kopar Khairane, Navi Mumbai & Airoli, Kalwa Industrial Area",
            MapPosition::new(65, 55),
            false,
            &[
                ("FTIR", "₹400/sample", "20 mg / 0.5 ml", "7 days"),
                ("Raman Spectroscopy (Regular)", "₹800/sample", "50 mg", "7 days"),
                ("Mass Spectrometry", "₹800/sample", "15 mg", "6 days"),
                ("NMR (H¹)", "₹900/sample", "20 mg", "6 days"),
                ("NMR (C¹³)", "₹1300/sample", "20 mg", "6 days"),
                ("NMR (P³¹)", "₹2000/sample", "20 mg", "6 days"),
                ("Zeta Potential", "₹1000/sample", "2 ml", "8 days"),
                ("Particle Size (Nanoscale)", "₹1000/sample", "100 mg / 2 ml", "8 days"),
                ("Particle Size (Micron)", "₹2500/sample", "1 g", "8 days"),
                ("DSC", "₹1500/sample", "20 mg / 0.5 ml", "10 days"),
                ("TGA", "₹1500/sample", "20 mg", "10 days"),
                ("Powder XRD", "₹1200/sample", "0.5 g", "10 days"),
                ("XRF", "₹2500/sample", "1 g", "10 days"),
                ("SEM (Micron)", "₹1500/sample", "30 mg / 0.5 ml", "8-25 days"),
                ("SEM-EDX", "₹1700/sample", "30 mg / 0.5 ml", "10 days"),
                ("FESEM", "₹2000/sample", "30 mg / 0.5 ml", "10 days"),
                ("FESEM-EDX", "₹2200/sample", "30 mg / 0.5 ml", "10 days"),
                ("TEM", "₹3500/sample", "30 mg / 0.5 ml", "10 days"),
                ("AFM", "₹2500/sample", "thin film 1×1 cm", "15 days"),
                ("GCMS (Library Search)", "₹4500/sample", "50 mg", "8 days"),
                ("LCMS", "₹3500/sample", "50 mg", "8 days"),
                ("CHNS Elemental", "₹4500/sample", "5 g / ml", "8 days"),
                ("BET Surface (Single Point)", "₹2200/sample", "0.5 g", "8 days"),
                ("BET Surface (Multipoint)", "₹3000/sample", "0.5 g", "8 days"),
                ("GPC (Aqueous)", "₹5000/sample", "1 g", "8 days"),
                ("GPC (Solvent)", "₹6000/sample", "1 g", "8 days"),
                ("XPS", "₹5000/sample", "20 mg", "20 days"),
                ("UV-Vis", "₹1500/sample", "20 mg", "10 days"),
                ("AAS (Per Element)", "₹1500/element", "1 g", "8 days"),
            ],
        ),
        lab(
            "ari",
            "Agharkar Research Institute (ARI), Pune",
            "G.G. Agarkar Road, Pune",
            MapPosition::new(35, 50),
            false,
            &[
                ("HPLC", "₹3000/hour", "1 hour", "5 days"),
                ("Ion Chromatography (Per Hour)", "₹4500/hour", "1 hour", "7 days"),
                ("Ion Chromatography (Per Sample)", "₹3000-6000/sample", "1 sample", "7 days"),
                ("GC Gas Analysis", "₹2200/sample", "50 mg", "8 days"),
                ("GC Solvent & VFA", "₹34000/sample", "50 mg", "10 days"),
                ("XRD (Regular)", "₹2000/sample", "0.5 g", "10 days"),
                ("XRD (Slow Scan)", "₹5000/sample", "0.5 g", "15 days"),
                ("FTIR", "₹1000/sample", "20 mg", "5 days"),
                ("AAS", "₹2500-5000/sample", "1 g", "8 days"),
                ("Lyophilization (Fungal/Microbial)", "₹2500-5000/batch", "1 batch", "10 days"),
                ("AFM Analysis", "₹35000/hour", "1 hour", "15 days"),
                ("Fluorescence Microscopy", "₹2500-3500/hour", "1 hour", "7 days"),
                ("SEM Cryo Mode", "₹7000/sample", "30 mg", "10 days"),
                ("SEM HV Mode", "₹3500/sample", "30 mg", "8 days"),
                ("SEM LV Mode", "₹2000-4000/sample", "30 mg", "8 days"),
                ("SEM+EDS", "₹3000-6000/sample", "30 mg", "10 days"),
                ("EDS Standalone", "₹1500/spot", "1 spot", "5 days"),
                ("HPTLC Qualitative", "₹4000/sample", "100 mg", "10 days"),
                ("HPTLC Quantitative", "₹6000/sample", "100 mg", "12 days"),
                ("Drug Study (Macro/Micro)", "₹4000/sample", "50 mg", "8 days"),
                ("Phytochemical Qualitative", "₹250/test", "50 mg", "5 days"),
                ("Phytochemical Quantitative", "₹2500/test", "100 mg", "10 days"),
                ("TLC Profile", "₹1000/sample", "50 mg", "7 days"),
            ],
        ),
    ]
}

fn builtin_categories() -> Vec<Category> {
    vec![
        category(
            "Microscopic Techniques",
            &[
                "Optical Microscope RT",
                "Optical Microscope HT",
                "Confocal Microscope",
                "AFM",
                "AFM Analysis",
                "SEM (FESEM)",
                "SEM (SEM+EDX)",
                "SEM (SEM+EDX+Mapping)",
                "SEM High Vacuum",
                "SEM High Vacuum + EDX",
                "SEM High Vacuum + Mapping",
                "SEM Low Vacuum",
                "SEM (Micron)",
                "SEM-EDX",
                "FESEM",
                "FESEM-EDX",
                "SEM Cryo Mode",
                "SEM HV Mode",
                "SEM LV Mode",
                "SEM+EDS",
                "EDS Standalone",
                "TEM",
                "Fluorescence Microscopy",
            ],
        ),
        category(
            "Mass Spectrometry & Chromatography",
            &[
                "Mass Spectrometry",
                "GCMS (Library Search)",
                "GC-MS (30 min run)",
                "GC-MS (50 min run)",
                "LCMS",
                "Gas Chromatography",
                "GC Gas Analysis",
                "GC Solvent & VFA",
                "HPLC (UV, UV-RI)",
                "HPLC",
                "UPLC",
                "High Temp GPC",
                "GPC (CHCl3, THF)",
                "Aqueous GPC",
                "GPC (Aqueous)",
                "GPC (Solvent)",
                "Ion Chromatography (Per Hour)",
                "Ion Chromatography (Per Sample)",
            ],
        ),
        category(
            "Spectroscopic Techniques",
            &[
                "FTIR",
                "Raman Spectroscopy (Regular)",
                "Raman Spectroscopy (Low Temp/HT)",
                "UV-Vis (Liquid)",
                "UV-Vis (Solid)",
                "UV-Vis-NIR (Liquid)",
                "UV-Vis-NIR (Solid)",
                "UV-Vis",
                "Fluorescence Spectrometer",
                "CD Spectrophotometer",
                "NMR (H¹)",
                "NMR (C¹³)",
                "NMR (P³¹)",
                "XRD (Regular)",
                "XRD (Slow Scan)",
                "Powder XRD",
                "XRF",
                "XPS",
            ],
        ),
        category(
            "Thermal & Physical Analysis",
            &[
                "DSC",
                "TGA",
                "Zeta Potential",
                "Particle Size (Nanoscale)",
                "Particle Size (Micron)",
                "BET Surface (Single Point)",
                "BET Surface (Multipoint)",
                "CHNS Elemental",
                "AAS (Per Element)",
                "AAS",
                "Lyophilization (Fungal/Microbial)",
            ],
        ),
        category(
            "Biological & Pharmaceutical",
            &[
                "HPTLC Qualitative",
                "HPTLC Quantitative",
                "Drug Study (Macro/Micro)",
                "Phytochemical Qualitative",
                "Phytochemical Quantitative",
                "TLC Profile",
            ],
        ),
    ]
}

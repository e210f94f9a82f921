// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The registration form's page catalog.
//!
//! Page indices, human-readable names, and which pages carry form
//! fields (the rest are intro/summary interstitials that only need
//! advancing past).

/// Number of pages in the form, landing page included.
pub const PAGE_COUNT: u32 = 77;

/// Final submission page; no transition leads out of it.
pub const TERMINAL_PAGE: u32 = 76;

/// Human-readable name for a page index.
pub fn page_name(page: u32) -> &'static str {
    match page {
        0 => "Landing Page",
        1 => "Login",
        2 => "3rd Party Service Provider",
        3 => "New or Continue Application",
        4 => "Introduction Info",
        5 => "Navigation Instructions",
        6 => "Required Documents",
        7 => "Financial Responsibility",
        8 => "Process Agent Notice",
        9 => "USDOT Number Issuance",
        10 => "Signature Authorization",
        11 => "Paperwork Reduction Act",
        12 => "Application ID",
        13 => "Application Contact Intro",
        14 => "Application Contact Form",
        15 => "Business Description Intro",
        16 => "Dun & Bradstreet",
        17 => "Legal Business Name",
        18 => "DBA Names",
        19 => "Principal Address Same",
        20 => "Business Addresses",
        21 => "Business Phone",
        22 => "EIN/SSN",
        23 => "Unit of Government",
        24 => "Form of Business",
        25 => "Ownership Control",
        26 => "Proprietor/Partners Names",
        27 => "Company Contact Address",
        28 => "Business Description Summary",
        29 => "Operation Classification Intro",
        30 => "Intermodal Equipment Provider",
        31 => "Transport Property",
        32 => "For-Hire Property",
        33 => "Property Types",
        34 => "Interstate Commerce",
        35 => "Transport Own Property",
        36 => "Transport Passengers",
        37 => "Broker Services",
        38 => "Freight Forwarder",
        39 => "Cargo Tank Facility",
        40 => "Towaway Operation",
        41 => "Cargo Classifications",
        42 => "Operation Classification Summary",
        43 => "Vehicles Intro",
        44 => "Non-CMV Property",
        45 => "Vehicle Types",
        46 => "Canada/Mexico Vehicles",
        47 => "Interstate Only Vehicles",
        48 => "Intrastate Only Vehicles",
        49 => "Vehicle Summary",
        50 => "Drivers Intro",
        51 => "Interstate Drivers",
        52 => "Intrastate Drivers",
        53 => "CDL Holders",
        54 => "Canada/Mexico Drivers",
        55 => "Driver Summary",
        56 => "Financial Responsibility Intro",
        57 => "Property 10,001+ lbs",
        58 => "Insurance Determination",
        59 => "Affiliation Intro",
        60 => "Affiliation Relationships",
        61 => "Affiliation Summary",
        62 => "Certification Statement Intro",
        63 => "E-Signature Certification",
        64 => "Compliance Certifications Intro",
        65 => "DOT Compliance Certification",
        66 => "Document Production Certification",
        67 => "Not Disqualified Certification",
        68 => "Process Agent Certification",
        69 => "Not Suspended/Revoked Certification",
        70 => "Deficiencies Corrected Certification",
        71 => "Compliance E-Signature",
        72 => "Compliance Certifications Summary",
        73 => "Applicant's Oath Intro",
        74 => "Applicant's Oath E-Signature",
        75 => "Identity Verification",
        76 => "Final Submission",
        _ => "Unknown Page",
    }
}

/// Whether a page carries fields to populate. Intro, instruction, and
/// summary pages only need advancing past.
pub fn has_fields(page: u32) -> bool {
    matches!(
        page,
        2 | 12
            | 14
            | 16..=25
            | 30..=41
            | 44..=48
            | 51..=54
            | 57
            | 60
            | 63
            | 65..=71
            | 74
    )
}

#[cfg(test)]
#[path = "pages_tests.rs"]
mod tests;

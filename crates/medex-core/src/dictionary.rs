/// Built-in clinical section dictionary.
///
/// Order matters: it is the order of the keys in every extraction result.
pub const MEDICAL_SECTIONS: &[(&str, &[&str])] = &[
    (
        "symptoms",
        &[
            "symptom",
            "symptoms",
            "signs include",
            "patients may experience",
            "characterized by",
            "may include",
        ],
    ),
    (
        "causes",
        &["cause", "causes", "caused by", "results from", "due to"],
    ),
    (
        "risk_factors",
        &[
            "risk factor",
            "risk factors",
            "increases risk",
            "higher risk",
            "associated with",
        ],
    ),
    (
        "diagnosis",
        &[
            "diagnosis",
            "diagnosed by",
            "identified using",
            "examination",
            "test",
            "screening",
        ],
    ),
    (
        "complications",
        &[
            "complication",
            "complications",
            "may lead to",
            "can result in",
        ],
    ),
    (
        "treatments",
        &[
            "treatment",
            "treatments",
            "therapy",
            "managed with",
            "surgery",
            "procedure",
            "drug",
            "medication",
        ],
    ),
    (
        "prevention",
        &[
            "prevention",
            "prevent",
            "avoid",
            "reduce risk",
            "protective measures",
        ],
    ),
];

pub const DEFAULT_WHEN_TO_SEE_A_DOCTOR: &str = "See a doctor if symptoms worsen or persist.";
pub const DEFAULT_NOTES: &str = "Extracted using keyword-based NLP (no AI).";

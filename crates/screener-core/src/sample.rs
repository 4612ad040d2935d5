//! Built-in job description used when none is supplied.

/// Junior Data Scientist posting.
pub const SAMPLE_JOB_DESCRIPTION: &str = r#"We are looking for a Junior Data Scientist.
Must have:
- Python (Pandas, NumPy, Scikit-Learn)
- Experience with SQL
- Basic understanding of Machine Learning algorithms
- Good communication skills
Nice to have:
- Experience with AWS or Cloud deployment
- Knowledge of NLP
"#;

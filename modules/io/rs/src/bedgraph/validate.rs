use eyre::{ensure, Result};

pub fn seqid(s: &str) -> Result<()> {
    ensure!(!s.is_empty(), "bedGraph seqid can't be empty");
    ensure!(
        s.len() <= 255,
        "bedGraph seqid can't be longer than 255 characters"
    );
    ensure!(
        !s.chars().any(|c| c.is_ascii_whitespace()),
        "bedGraph seqid can only contain non-whitespace characters, got: {}",
        s
    );
    Ok(())
}

pub fn value(value: f64) -> Result<()> {
    ensure!(
        value.is_finite(),
        "bedGraph value must be a finite number, got: {}",
        value
    );
    Ok(())
}

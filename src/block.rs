use crate::error::Error;

/// Canonicalizes a loosely-formatted block id into the dashed 8-4-4-4-12 form
/// the service expects. Strips any existing hyphens first, so the operation
/// is idempotent. Ids that do not strip down to exactly 32 hex characters are
/// rejected.
pub fn normalize_block_id(block_id: &str) -> Result<String, Error> {
    let stripped: String = block_id.chars().filter(|c| *c != '-').collect();

    if stripped.len() != 32 || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidIdentifier(format!(
            "Block id `{block_id}` must contain exactly 32 hex characters besides hyphens."
        )));
    }

    Ok(format!(
        "{}-{}-{}-{}-{}",
        &stripped[0..8],
        &stripped[8..12],
        &stripped[12..16],
        &stripped[16..20],
        &stripped[20..32]
    ))
}

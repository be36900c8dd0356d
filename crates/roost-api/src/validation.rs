use crate::error::ApiError;

const MAX_CHIRP_CHARS: usize = 140;

/// Matched case-insensitively against whole space-delimited words, so a word
/// with punctuation stuck to it passes through untouched.
const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Reject over-long chirp bodies and mask the banned words. Length is
/// checked on the body as submitted; a pre-cleaned body of exactly 140
/// characters is fine.
pub fn clean_chirp_body(body: &str) -> Result<String, ApiError> {
    if body.chars().count() > MAX_CHIRP_CHARS {
        return Err(ApiError::BadRequest("chirp is too long".into()));
    }

    let cleaned = body
        .split(' ')
        .map(|word| {
            if BANNED_WORDS
                .iter()
                .any(|banned| word.eq_ignore_ascii_case(banned))
            {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<&str>>()
        .join(" ");
    Ok(cleaned)
}

//! Names for hoisted anonymous schemas.
//!
//! A nested schema promoted to a top-level declaration is named after its
//! path from the root declaration: `Post` / `comments` / `Item` becomes
//! `PostCommentsItem`.

/// Concatenate capitalized path segments into a declaration name.
pub fn synthesize_name<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| capitalize(segment.as_ref()))
        .collect()
}

/// Capitalize every alphanumeric run of a segment and drop separators.
///
/// `author` -> `Author`, `created_at` -> `CreatedAt`, `x-rate-limit` -> `XRateLimit`.
/// Characters after the first of each run keep their case, so `blogPost`
/// stays `BlogPost`.
pub fn capitalize(segment: &str) -> String {
    segment
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

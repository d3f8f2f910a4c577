/// Normalizes raw page text
///
/// Every character outside ASCII letters, digits and whitespace is replaced by
/// a space, whitespace runs collapse to a single space, leading and trailing
/// whitespace is dropped, and the result is lower-cased.
///
/// # Examples
///
/// ```
/// use sitecrawl::text::clean_text;
///
/// assert_eq!(clean_text("A1!!b2??"), "a1 b2");
/// assert_eq!(clean_text("  Hello,\n\tWorld  "), "hello world");
/// assert_eq!(clean_text(""), "");
/// ```
pub fn clean_text(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_space && !cleaned.is_empty() {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.push(c.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }

    cleaned
}

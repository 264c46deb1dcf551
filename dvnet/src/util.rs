use crate::concepts::packet::DST_LENGTH;

/// Left-pads a node name with `'0'` up to the destination field width
///
/// returns: None if the name does not fit in the field
///
/// # Examples
///
/// ```
/// assert_eq!(dvnet::util::pad_address("42").as_deref(), Some("00042"));
/// assert_eq!(dvnet::util::pad_address("H1").as_deref(), Some("000H1"));
/// assert_eq!(dvnet::util::pad_address("router"), None);
/// ```
pub fn pad_address(name: &str) -> Option<String> {
    let width = name.chars().count();
    if width > DST_LENGTH {
        return None;
    }
    let mut field = "0".repeat(DST_LENGTH - width);
    field.push_str(name);
    Some(field)
}

/// Strips `'0'` from both ends of a destination field.
///
/// NOTE: this also eats a real trailing zero, `"00010"` becomes `"1"`.
///
/// ```
/// assert_eq!(dvnet::util::strip_address("000H1"), "H1");
/// assert_eq!(dvnet::util::strip_address("00010"), "1");
/// assert_eq!(dvnet::util::strip_address("00000"), "");
/// ```
pub fn strip_address(field: &str) -> &str {
    field.trim_matches('0')
}

/// Shortcut for cost addition that never wraps
pub fn sum_cost(cost_a: u32, cost_b: u32) -> u32 {
    cost_a.saturating_add(cost_b)
}

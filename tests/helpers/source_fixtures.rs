//! Common document fixtures for tests.

#![allow(dead_code)]

pub const EMPTY: &str = "";

pub const SINGLE_LINE: &str = "name = \"reweave\"";

pub const PLAIN_LINES: &str = r#"# settings
width = 80
height = 24
title = "demo"
"#;

pub const FENCED_BLOCKS: &str = r#"intro text
```python
def f(x):
    return x
```
between
```sql
select 1;
```
outro
"#;

pub const UNTERMINATED_BLOCK: &str = r#"before
```python
print("never closed")
"#;

/// `count` numbered lines, each ending in a newline.
pub fn numbered_lines(count: usize) -> String {
    (0..count).map(|i| format!("line {i} = {i}\n")).collect()
}

/// Exactly `len` bytes of five-byte lines.
pub fn sized_document(len: usize) -> String {
    assert_eq!(len % 5, 0, "length must be a multiple of the line length");
    "text\n".repeat(len / 5)
}

/// Byte offset of the first occurrence of `needle` in `text`.
pub fn offset_of(text: &str, needle: &str) -> u32 {
    text.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in fixture")) as u32
}

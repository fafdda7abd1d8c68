//! Module table parsing
//!
//! The module table is a text manifest of loaded kernel modules: one module
//! per line, whitespace-separated fields, where field 0 is the module name,
//! field 1 is the decimal size in bytes, and somewhere on the line sits a
//! `0x`-prefixed 16-digit lowercase hex base load address (`/proc/modules`
//! with addresses visible has this shape). Any line that does not yield all
//! three is a fatal parse error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::TableError;
use crate::router::AddressRange;

static BASE_ADDR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b0x[0-9a-f]{16}\b").unwrap());

/// One parsed module-table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: String,
    /// Module size in bytes.
    pub size: u64,
    /// Base load address.
    pub base: u64,
}

impl ModuleEntry {
    /// Path of the module binary under `module_dir`.
    #[must_use]
    pub fn binary_path(&self, module_dir: &Path) -> PathBuf {
        module_dir.join(format!("{}.ko", self.name))
    }

    /// Address range `[base, base + size)` occupied by the module.
    ///
    /// # Errors
    /// Fails if `base + size` overflows the address space.
    pub fn range(&self) -> Result<AddressRange, TableError> {
        let end = self.base.checked_add(self.size).ok_or_else(|| TableError::RangeOverflow {
            name: self.name.clone(),
            base: self.base,
            size: self.size,
        })?;
        Ok(AddressRange { start: self.base, end })
    }
}

/// Parse a module table file into entries, preserving line order.
///
/// # Errors
/// Fails if the file cannot be read or any line is malformed (missing name
/// or size field, non-decimal size, or no base address token).
pub fn parse_module_table(path: &Path) -> Result<Vec<ModuleEntry>, TableError> {
    parse_module_lines(&fs::read_to_string(path)?)
}

fn parse_module_lines(text: &str) -> Result<Vec<ModuleEntry>, TableError> {
    let mut entries = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let mut fields = line.split_whitespace();

        let name = fields.next().ok_or_else(|| malformed(lineno, "missing module name"))?;
        let size = fields
            .next()
            .ok_or_else(|| malformed(lineno, "missing size field"))?
            .parse::<u64>()
            .map_err(|_| malformed(lineno, "size is not a decimal byte count"))?;
        let base = BASE_ADDR_RE
            .find(line)
            .ok_or_else(|| malformed(lineno, "no 0x-prefixed 16-digit base address"))?;
        // 16 lowercase hex digits always fit in a u64
        let base = u64::from_str_radix(&base.as_str()[2..], 16)
            .map_err(|_| malformed(lineno, "base address out of range"))?;

        entries.push(ModuleEntry { name: name.to_string(), size, base });
    }

    Ok(entries)
}

fn malformed(line: usize, reason: &str) -> TableError {
    TableError::MalformedLine { line, reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_modules_style_line() {
        let entries =
            parse_module_lines("mymod 4096 0 - Live 0xffffffffc0001000 (O)\n").unwrap();
        assert_eq!(
            entries,
            vec![ModuleEntry {
                name: "mymod".to_string(),
                size: 4096,
                base: 0xffff_ffff_c000_1000
            }]
        );
    }

    #[test]
    fn test_parse_preserves_line_order() {
        let text = "bbb 8192 0 - Live 0xffffffffc0002000\n\
                    aaa 4096 0 - Live 0xffffffffc0001000\n";
        let entries = parse_module_lines(text).unwrap();
        assert_eq!(entries[0].name, "bbb");
        assert_eq!(entries[1].name, "aaa");
    }

    #[test]
    fn test_empty_table_has_no_entries() {
        assert!(parse_module_lines("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_base_address_is_fatal() {
        let err = parse_module_lines("mymod 4096 0 - Live\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_short_address_token_is_fatal() {
        // 12 digits, not 16
        let err = parse_module_lines("mymod 4096 0 - Live 0xffffc0001000\n").unwrap_err();
        assert!(err.to_string().contains("base address"));
    }

    #[test]
    fn test_non_decimal_size_is_fatal() {
        let err = parse_module_lines("mymod 0x1000 0 - Live 0xffffffffc0001000\n").unwrap_err();
        assert!(err.to_string().contains("size"));
    }

    #[test]
    fn test_blank_line_is_fatal() {
        let err = parse_module_lines("mymod 4096 0 - Live 0xffffffffc0001000\n\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_binary_path_joins_dir_name_and_suffix() {
        let entry =
            ModuleEntry { name: "mymod".to_string(), size: 4096, base: 0xffff_ffff_c000_1000 };
        assert_eq!(
            entry.binary_path(Path::new("/lib/modules/extra")),
            PathBuf::from("/lib/modules/extra/mymod.ko")
        );
    }

    #[test]
    fn test_range_is_base_plus_size() {
        let entry =
            ModuleEntry { name: "mymod".to_string(), size: 4096, base: 0xffff_ffff_c000_1000 };
        let range = entry.range().unwrap();
        assert!(range.contains(0xffff_ffff_c000_1050));
        assert!(!range.contains(0xffff_ffff_c000_2000));
    }

    #[test]
    fn test_range_overflow_is_fatal() {
        let entry = ModuleEntry { name: "mymod".to_string(), size: 0x2000, base: u64::MAX - 0xfff };
        assert!(entry.range().is_err());
    }
}

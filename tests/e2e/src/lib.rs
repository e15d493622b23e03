//! # e2e-tests - End-to-end тесты CLI инструментов
//!
//! Этот крейт содержит e2e тесты для CLI инструментов воркспейса:
//! - `icl-convert` — конвертер X9 / JSON / CSV
//! - `icl-compare` — сравнение items двух файлов
//!
//! ## Фикстуры
//!
//! Тестовые файлы расположены в `fixtures/`:
//! - `sample.x9` — корректный файл: один cash letter, две пачки, три items
//! - `out_of_order.x9` — Addendum B стоит перед Check Detail (строка 4)

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result, bail};

/// Получить путь к директории фикстур.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Получить путь к фикстуре по имени файла.
pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Копирует X9-фикстуру в `dest`, выбросив строки с номерами из `skip` (1-based).
pub fn write_without_lines(name: &str, dest: &Path, skip: &[usize]) -> Result<()> {
    let bytes = fs::read(fixture(name)).with_context(|| format!("read fixture {name}"))?;
    let mut out = Vec::with_capacity(bytes.len());
    for (idx, line) in bytes.split_inclusive(|b| *b == b'\n').enumerate() {
        if !skip.contains(&(idx + 1)) {
            out.extend_from_slice(line);
        }
    }
    fs::write(dest, out).with_context(|| format!("write {}", dest.display()))
}

/// Копирует фикстуру в `dest`, заменив первое вхождение `from` на `to`.
pub fn write_replaced(name: &str, dest: &Path, from: &[u8], to: &[u8]) -> Result<()> {
    let mut bytes = fs::read(fixture(name)).with_context(|| format!("read fixture {name}"))?;
    let Some(pos) = bytes.windows(from.len()).position(|w| w == from) else {
        bail!("pattern not found in {name}");
    };
    bytes.splice(pos..pos + from.len(), to.iter().copied());
    fs::write(dest, bytes).with_context(|| format!("write {}", dest.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_exist() {
        assert!(fixture("sample.x9").is_file());
        assert!(fixture("out_of_order.x9").is_file());
    }

    #[test]
    fn drops_selected_lines() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("short.x9");

        write_without_lines("sample.x9", &dest, &[12, 13]).unwrap();

        let original = fs::read(fixture("sample.x9")).unwrap();
        let short = fs::read(&dest).unwrap();
        assert_eq!(short.len(), original.len() - 2 * 81);
    }

    #[test]
    fn replace_reports_missing_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.x9");

        assert!(write_replaced("sample.x9", &dest, b"no such text", b"").is_err());
    }
}

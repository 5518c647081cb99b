/*
 * common/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * A deterministic transform with a precise source map, for pipeline tests.
 */

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use inspector_pipeline::{TransformError, TransformOptions, TransformOutput, Transformer};
use inspector_source_map::{MapPayload, SourceMap};

pub const HEADER: &str = "/* compiled */";

/// Kind of source map an [`IndentTransform`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    Valid,
    /// Text that is not JSON
    BadJson,
    /// Well-formed JSON whose mappings do not decode
    BadMappings,
}

/// Prepends a header line and indents every line by two columns
///
/// Every original column `c` of line `l` maps to generated `(l + 1, c + 2)`.
/// Sources containing `<<<` fail with a syntax error.
pub struct IndentTransform {
    pub calls: Arc<AtomicUsize>,
    pub map_mode: MapMode,
}

impl Transformer for IndentTransform {
    fn transform(
        &mut self,
        source: &str,
        options: &TransformOptions<'_>,
    ) -> Result<TransformOutput, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(offset) = source.find("<<<") {
            return Err(TransformError::new(format!(
                "{}: Unexpected token ({offset})",
                options.file_name
            )));
        }

        let map = match self.map_mode {
            MapMode::Valid => MapPayload::Object(indent_map(source, options.source_file_name)),
            MapMode::BadJson => MapPayload::Text("{\"version\":3,\"mappings\":".to_string()),
            MapMode::BadMappings => MapPayload::Object(SourceMap {
                mappings: "AA!A".to_string(),
                ..indent_map(source, options.source_file_name)
            }),
        };

        Ok(TransformOutput {
            code: indent_code(source),
            map: Some(map),
        })
    }
}

pub fn indent_code(source: &str) -> String {
    let body: Vec<String> = source.split('\n').map(|line| format!("  {line}")).collect();
    format!("{HEADER}\n{}", body.join("\n"))
}

/// Source map for [`indent_code`]; sources must be ASCII
pub fn indent_map(source: &str, file_name: &str) -> SourceMap {
    // The header line has no segments
    let mut mappings = String::from(";");
    let mut prev_line = 0i64;
    let mut prev_column = 0i64;

    for (line_idx, line) in source.split('\n').enumerate() {
        if line_idx > 0 {
            mappings.push(';');
        }
        let mut prev_generated = 0i64;
        for column in 0..line.len() as i64 {
            if column > 0 {
                mappings.push(',');
            }
            let line_idx = line_idx as i64;
            vlq_encode(column + 2 - prev_generated, &mut mappings);
            vlq_encode(0, &mut mappings);
            vlq_encode(line_idx - prev_line, &mut mappings);
            vlq_encode(column - prev_column, &mut mappings);

            prev_generated = column + 2;
            prev_line = line_idx;
            prev_column = column;
        }
    }

    SourceMap {
        version: 3,
        file: None,
        sources: vec![file_name.to_string()],
        names: Vec::new(),
        mappings,
        source_root: None,
        sources_content: None,
    }
}

/// VLQ encode a signed integer
fn vlq_encode(value: i64, out: &mut String) {
    const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    let mut unsigned: u64 = if value < 0 {
        (((-value) << 1) | 1) as u64
    } else {
        (value << 1) as u64
    };

    loop {
        let mut digit = (unsigned & 0x1F) as u8;
        unsigned >>= 5;
        if unsigned > 0 {
            digit |= 0x20;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if unsigned == 0 {
            break;
        }
    }
}

pub fn indent_loader(
    calls: Arc<AtomicUsize>,
    map_mode: MapMode,
) -> impl Fn() -> Result<Box<dyn Transformer>, TransformError> + Send + 'static {
    move || -> Result<Box<dyn Transformer>, TransformError> {
        Ok(Box::new(IndentTransform {
            calls: Arc::clone(&calls),
            map_mode,
        }))
    }
}

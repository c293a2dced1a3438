//! Placeholder substitution for the HTML page templates.

enum Segment<'a> {
    Literal(&'a str),
    Value(&'a str),
}

/// Substitutes `(placeholder, value)` pairs into `template`.
///
/// Pairs are applied in order, each replacing the first occurrence of its
/// placeholder that is still part of the original template text. Inserted
/// values are never searched again, so a value that happens to contain a
/// placeholder token comes out literally. Missing placeholders are ignored.
/// Nothing is escaped here.
pub fn project<P, V>(template: &str, substitutions: &[(P, V)]) -> String
where
    P: AsRef<str>,
    V: AsRef<str>,
{
    let mut segments = vec![Segment::Literal(template)];

    for (placeholder, value) in substitutions {
        let placeholder = placeholder.as_ref();
        if placeholder.is_empty() {
            continue;
        }
        let hit = segments
            .iter()
            .enumerate()
            .find_map(|(idx, segment)| match segment {
                Segment::Literal(text) => text.find(placeholder).map(|offset| (idx, *text, offset)),
                Segment::Value(_) => None,
            });
        let Some((idx, text, offset)) = hit else {
            continue;
        };
        segments[idx] = Segment::Literal(&text[..offset]);
        segments.insert(idx + 1, Segment::Value(value.as_ref()));
        segments.insert(idx + 2, Segment::Literal(&text[offset + placeholder.len()..]));
    }

    let capacity = segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) | Segment::Value(text) => text.len(),
        })
        .sum();
    let mut out = String::with_capacity(capacity);
    for segment in &segments {
        match segment {
            Segment::Literal(text) | Segment::Value(text) => out.push_str(text),
        }
    }
    out
}

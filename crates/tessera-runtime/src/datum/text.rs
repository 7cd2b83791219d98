//! Textual forms of datum elements.
//!
//! Integers print in decimal, floats with six decimals. Vectors print as
//! `vec4( x, y, z, w )` and matrices as
//! `mat4x4( (a, b, c, d), (e, f, g, h), (i, j, k, l), (m, n, o, p) )`.
//! Parsing accepts any whitespace around numbers and punctuation.

use tessera_core::{DatumError, DatumType, Mat4, Vec4};

pub(crate) fn format_float(v: f32) -> String {
    format!("{v:.6}")
}

fn format_group(v: &Vec4) -> String {
    let [x, y, z, w] = v.0.map(format_float);
    format!("{x}, {y}, {z}, {w}")
}

pub(crate) fn format_vector(v: &Vec4) -> String {
    format!("vec4( {} )", format_group(v))
}

pub(crate) fn format_matrix(m: &Mat4) -> String {
    let [a, b, c, d] = m.0.map(|g| format!("({})", format_group(&g)));
    format!("mat4x4( {a}, {b}, {c}, {d} )")
}

fn parse_error(input: &str, datum_type: DatumType) -> DatumError {
    DatumError::Parse {
        input: input.to_owned(),
        datum_type,
    }
}

pub(crate) fn parse_integer(input: &str) -> Result<i32, DatumError> {
    input
        .trim()
        .parse()
        .map_err(|_| parse_error(input, DatumType::Integer))
}

pub(crate) fn parse_float(input: &str) -> Result<f32, DatumError> {
    input
        .trim()
        .parse()
        .map_err(|_| parse_error(input, DatumType::Float))
}

/// Splits the body after `prefix` into parenthesized groups of numbers.
///
/// Returns the numbers of each innermost group, in order. Nesting deeper
/// than `max_depth` or unbalanced parentheses yield `None`.
fn groups(input: &str, prefix: &str, max_depth: usize) -> Option<Vec<Vec<f32>>> {
    let body = input.trim().strip_prefix(prefix)?;
    let mut depth = 0usize;
    let mut out: Vec<Vec<f32>> = Vec::new();
    let mut token = String::new();

    fn flush(token: &mut String, out: &mut [Vec<f32>]) -> Option<()> {
        if token.is_empty() {
            return Some(());
        }
        let v = token.parse().ok()?;
        out.last_mut()?.push(v);
        token.clear();
        Some(())
    }

    for c in body.chars() {
        match c {
            '(' => {
                flush(&mut token, &mut out)?;
                depth += 1;
                if depth > max_depth {
                    return None;
                }
                if depth == max_depth {
                    out.push(Vec::new());
                }
            }
            ')' => {
                flush(&mut token, &mut out)?;
                depth = depth.checked_sub(1)?;
            }
            ',' => flush(&mut token, &mut out)?,
            c if c.is_whitespace() => flush(&mut token, &mut out)?,
            c => {
                if depth != max_depth {
                    return None;
                }
                token.push(c);
            }
        }
    }
    (depth == 0 && token.is_empty()).then_some(out)
}

fn as_vec4(group: &[f32]) -> Option<Vec4> {
    <[f32; 4]>::try_from(group).ok().map(Vec4)
}

pub(crate) fn parse_vector(input: &str) -> Result<Vec4, DatumError> {
    groups(input, "vec4", 1)
        .and_then(|g| match g.as_slice() {
            [only] => as_vec4(only),
            _ => None,
        })
        .ok_or_else(|| parse_error(input, DatumType::Vector))
}

pub(crate) fn parse_matrix(input: &str) -> Result<Mat4, DatumError> {
    groups(input, "mat4x4", 2)
        .and_then(|g| {
            if g.len() != 4 {
                return None;
            }
            let mut m = Mat4::ZERO;
            for (slot, group) in m.0.iter_mut().zip(&g) {
                *slot = as_vec4(group)?;
            }
            Some(m)
        })
        .ok_or_else(|| parse_error(input, DatumType::Matrix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_text_form() {
        let v = Vec4::new(1.0, -2.5, 0.0, 4.25);
        assert_eq!(
            format_vector(&v),
            "vec4( 1.000000, -2.500000, 0.000000, 4.250000 )"
        );
        assert_eq!(parse_vector(&format_vector(&v)), Ok(v));
    }

    #[test]
    fn vector_parse_tolerates_whitespace() {
        assert_eq!(
            parse_vector("  vec4(1,2 ,3,   4)"),
            Ok(Vec4::new(1.0, 2.0, 3.0, 4.0))
        );
    }

    #[test]
    fn vector_parse_rejects_wrong_arity_and_garbage() {
        assert!(parse_vector("vec4( 1, 2, 3 )").is_err());
        assert!(parse_vector("vec3( 1, 2, 3, 4 )").is_err());
        assert!(parse_vector("vec4( 1, 2, x, 4 )").is_err());
        assert!(parse_vector("vec4( 1, 2, 3, 4").is_err());
        assert!(parse_vector("vec4( (1, 2, 3, 4) )").is_err());
    }

    #[test]
    fn matrix_text_form() {
        let m = Mat4::from([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]);
        let text = format_matrix(&m);
        assert!(text.starts_with("mat4x4( (1.000000, 2.000000, 3.000000, 4.000000), "));
        assert_eq!(parse_matrix(&text), Ok(m));
        assert_eq!(
            parse_matrix("mat4x4((1,0,0,0),(0,1,0,0),(0,0,1,0),(0,0,0,1))"),
            Ok(Mat4::IDENTITY)
        );
    }

    #[test]
    fn matrix_parse_rejects_short_groups() {
        assert!(parse_matrix("mat4x4((1,0,0,0),(0,1,0,0),(0,0,1,0))").is_err());
        assert!(parse_matrix("mat4x4((1,0,0),(0,1,0,0),(0,0,1,0),(0,0,0,1))").is_err());
        assert!(parse_matrix("mat4x4(1,0,0,0)").is_err());
    }

    #[test]
    fn scalars_parse_trimmed() {
        assert_eq!(parse_integer(" 42 "), Ok(42));
        assert_eq!(parse_float("2.5"), Ok(2.5));
        assert_eq!(
            parse_integer("forty"),
            Err(DatumError::Parse {
                input: "forty".into(),
                datum_type: DatumType::Integer,
            })
        );
        assert_eq!(format_float(0.1), "0.100000");
    }
}

//! Static Helvetica glyph widths used for greedy word-wrap.
//!
//! Widths are in em units (AFM width / 1000) and cover ASCII 0x20..=0x7E.
//! Index = (char as usize) - 32. Bold text is approximated by scaling the
//! regular widths.

use super::FontStyle;

const POINT_TO_MM: f32 = 25.4 / 72.0;
const BOLD_SCALE: f32 = 1.06;
const AVERAGE_CHAR_WIDTH: f32 = 0.55;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [f32; 95] = [
    // sp    !      "      #      $      %      &      '
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191,
    // (     )      *      +      ,      -      .      /
    0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0-9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :     ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A     B      C      D      E      F      G      H      I      J      K      L      M
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    // N     O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [     \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a     b      c      d      e      f      g      h      i      j      k      l      m
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    // n     o      p      q      r      s      t      u      v      w      x      y      z
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {     |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

fn char_width_em(c: char) -> f32 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_CHAR_WIDTH
    }
}

/// Rendered width of `s` in millimetres.
pub fn measure_mm(s: &str, style: FontStyle, size_pt: f32) -> f32 {
    let em: f32 = s.chars().map(char_width_em).sum();
    let scale = match style {
        FontStyle::Bold => BOLD_SCALE,
        FontStyle::Regular | FontStyle::Italic => 1.0,
    };
    em * scale * size_pt * POINT_TO_MM
}

/// Greedy word-wrap. Words wider than a full line get a line of their own.
pub fn wrap(text: &str, width_mm: f32, style: FontStyle, size_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure_mm(&candidate, style, size_pt) <= width_mm {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

use flowtype::{FieldContext, FieldResolver, Span, TextStyle};

/// Numbering style of a page number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberFormat {
    #[default]
    Arabic,
    LowerRoman,
    UpperRoman,
    /// a, b, ..., z, aa, ab, ...
    LowerAlpha,
}

impl NumberFormat {
    pub fn format(self, number: usize) -> String {
        match self {
            Self::Arabic => number.to_string(),
            Self::LowerRoman => roman(number),
            Self::UpperRoman => roman(number).to_ascii_uppercase(),
            Self::LowerAlpha => alpha(number),
        }
    }
}

fn roman(mut number: usize) -> String {
    const NUMERALS: &[(usize, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for &(value, numeral) in NUMERALS {
        while number >= value {
            out.push_str(numeral);
            number -= value;
        }
    }
    out
}

fn alpha(mut number: usize) -> String {
    let mut out = Vec::new();
    while number > 0 {
        number -= 1;
        out.push(b'a' + (number % 26) as u8);
        number /= 26;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

/// Field showing the number of the page it is typeset on.
///
/// Resolves to `?` outside a paginated container.
#[derive(Clone, Debug)]
pub struct PageNumberField {
    style: TextStyle,
    format: NumberFormat,
}

impl PageNumberField {
    pub fn new(style: TextStyle) -> Self {
        Self {
            style,
            format: NumberFormat::default(),
        }
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }
}

impl FieldResolver for PageNumberField {
    fn resolve(&self, ctx: &FieldContext) -> Vec<Span> {
        let text = match ctx.page_number {
            Some(number) => self.format.format(number),
            None => {
                log::debug!("page number field resolved outside a page");
                "?".to_string()
            }
        };
        vec![Span::text(text, &self.style)]
    }
}

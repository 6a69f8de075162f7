//! Tab stop definitions and the cursor-to-stop resolver.

/// Alignment of text against a tab stop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabAlign {
    /// Text starts at the stop.
    #[default]
    Left,
    /// Text ends at the stop.
    Right,
    /// Text is centered on the stop.
    Center,
}

/// Where a tab stop sits on the line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TabPosition {
    /// Absolute offset from the line start.
    Absolute(f32),
    /// Fraction of the available line width.
    Fraction(f32),
}

impl TabPosition {
    /// Resolve against a line of `width`.
    pub fn resolve(self, width: f32) -> f32 {
        match self {
            Self::Absolute(offset) => offset,
            Self::Fraction(fraction) => width * fraction,
        }
    }
}

/// A configured tab stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TabStop {
    pub position: TabPosition,
    pub align: TabAlign,
    /// Leader character repeated to fill the tab, if any.
    pub fill: Option<char>,
}

impl TabStop {
    pub fn new(position: TabPosition, align: TabAlign) -> Self {
        Self {
            position,
            align,
            fill: None,
        }
    }

    /// Left-aligned stop at an absolute offset.
    pub fn left(offset: f32) -> Self {
        Self::new(TabPosition::Absolute(offset), TabAlign::Left)
    }

    /// Right-aligned stop at an absolute offset.
    pub fn right(offset: f32) -> Self {
        Self::new(TabPosition::Absolute(offset), TabAlign::Right)
    }

    /// Center-aligned stop at an absolute offset.
    pub fn center(offset: f32) -> Self {
        Self::new(TabPosition::Absolute(offset), TabAlign::Center)
    }

    pub fn with_fill(mut self, fill: char) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// A tab stop together with its position on a concrete line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedTabStop {
    pub stop: TabStop,
    pub position: f32,
}

/// First stop strictly past `cursor` on a line of `width`.
pub fn find_tab_stop(stops: &[TabStop], width: f32, cursor: f32) -> Option<ResolvedTabStop> {
    stops.iter().find_map(|stop| {
        let position = stop.position.resolve(width);
        (cursor < position).then_some(ResolvedTabStop {
            stop: *stop,
            position,
        })
    })
}

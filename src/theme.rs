use crossterm::style::Color;

/// Colors used when diagnostics are echoed to a terminal.
pub struct Theme {
    pub error: Color,
    pub warning: Color,
    pub location: Color, // Grey
    pub message: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    error: Color::Rgb {
        r: 243,
        g: 139,
        b: 168,
    },
    warning: Color::Rgb {
        r: 249,
        g: 226,
        b: 175,
    },
    location: Color::Rgb {
        r: 108,
        g: 112,
        b: 134,
    },
    message: Color::Rgb {
        r: 205,
        g: 214,
        b: 244,
    },
};

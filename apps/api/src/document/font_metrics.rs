//! Built-in glyph widths for the standard 14 PDF fonts.
//!
//! A simple font that names a base-14 face is allowed to omit `/Widths`; the
//! viewer is expected to know them. These tables are that knowledge, for the
//! faces resumes actually use. Widths are in glyph space units (1/1000 em).
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (code as usize) - 32.
//!
//! Oblique and italic faces reuse the upright table. The difference is a few
//! units per glyph and only nudges highlight boxes.

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base14Family {
    Helvetica,
    HelveticaBold,
    Times,
    TimesBold,
    Courier,
}

impl Base14Family {
    /// Maps a `/BaseFont` name to the closest built-in table.
    ///
    /// Subset prefixes (`ABCDEF+`) are ignored and common metric-compatible
    /// substitutes are recognized (`Arial` for Helvetica, `TimesNewRoman` for
    /// Times). Unknown names get Helvetica.
    pub fn from_base_font(name: &str) -> Self {
        let name = match name.split_once('+') {
            Some((prefix, rest)) if prefix.len() == 6 => rest,
            _ => name,
        };
        let lower = name.to_ascii_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");

        if lower.contains("courier") || lower.contains("mono") {
            Base14Family::Courier
        } else if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
            if bold {
                Base14Family::TimesBold
            } else {
                Base14Family::Times
            }
        } else if bold {
            Base14Family::HelveticaBold
        } else {
            Base14Family::Helvetica
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Width slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
#[derive(Debug)]
pub struct FontMetricTable {
    pub family: Base14Family,
    widths: [u16; 95],
    /// Used for codes outside 0x20..=0x7E.
    pub average_width: u16,
}

impl FontMetricTable {
    /// Width of a single-byte character code, in glyph space units.
    pub fn width_of(&self, code: u32) -> f64 {
        let width = match code {
            32..=126 => self.widths[(code - 32) as usize],
            _ => self.average_width,
        };
        f64::from(width)
    }

    /// Width of an ASCII string, in glyph space units.
    pub fn measure_str(&self, s: &str) -> f64 {
        s.chars().map(|c| self.width_of(c as u32)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    family: Base14Family::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0   1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :   ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [   \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {   |    }    ~
        334, 260, 334, 584,
    ],
    average_width: 556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    family: Base14Family::HelveticaBold,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0   1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :   ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [   \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {   |    }    ~
        389, 280, 389, 584,
    ],
    average_width: 611,
};

static TIMES_TABLE: FontMetricTable = FontMetricTable {
    family: Base14Family::Times,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0   1    2    3    4    5    6    7    8    9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        278, 278, 564, 564, 564, 444, 921,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        // N   O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [   \    ]    ^    _    `
        333, 278, 333, 469, 500, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // {   |    }    ~
        480, 200, 480, 541,
    ],
    average_width: 500,
};

static TIMES_BOLD_TABLE: FontMetricTable = FontMetricTable {
    family: Base14Family::TimesBold,
    #[rustfmt::skip]
    widths: [
        // sp  !    "    #    $    %     &    '    (    )    *    +    ,    -    .    /
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        // 0   1    2    3    4    5    6    7    8    9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :   ;    <    =    >    ?    @
        333, 333, 570, 570, 570, 500, 930,
        // A   B    C    D    E    F    G    H    I    J    K    L    M
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
        // N   O    P    Q    R    S    T    U    V    W     X    Y    Z
        722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
        // [   \    ]    ^    _    `
        333, 278, 333, 581, 500, 333,
        // a   b    c    d    e    f    g    h    i    j    k    l    m
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
        // n   o    p    q    r    s    t    u    v    w    x    y    z
        556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
        // {   |    }    ~
        394, 220, 394, 520,
    ],
    average_width: 500,
};

// Monospaced.
static COURIER_TABLE: FontMetricTable = FontMetricTable {
    family: Base14Family::Courier,
    widths: [600; 95],
    average_width: 600,
};

/// Returns the static metric table for a base-14 family.
pub fn get_metrics(family: Base14Family) -> &'static FontMetricTable {
    match family {
        Base14Family::Helvetica => &HELVETICA_TABLE,
        Base14Family::HelveticaBold => &HELVETICA_BOLD_TABLE,
        Base14Family::Times => &TIMES_TABLE,
        Base14Family::TimesBold => &TIMES_BOLD_TABLE,
        Base14Family::Courier => &COURIER_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

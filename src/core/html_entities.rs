//! HTML named character references
//!
//! The HTML 4 entity set: Latin-1, symbols and Greek, and the special
//! characters. Names are case-sensitive (`&Eacute;` is not `&eacute;`).

/// Latin-1 names for U+00A0..=U+00FF, in code point order
const LATIN1: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect",
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr",
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot",
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil",
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml",
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times",
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig",
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml",
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide",
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml",
];

/// Greek capitals from U+0391; U+03A2 is unassigned
const GREEK_UPPER: [&str; 25] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta",
    "Iota", "Kappa", "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi",
    "Rho", "", "Sigma", "Tau", "Upsilon", "Phi", "Chi", "Psi", "Omega",
];

/// Greek small letters from U+03B1
const GREEK_LOWER: [&str; 25] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta",
    "iota", "kappa", "lambda", "mu", "nu", "xi", "omicron", "pi",
    "rho", "sigmaf", "sigma", "tau", "upsilon", "phi", "chi", "psi", "omega",
];

static OTHER: &[(&str, char)] = &[
    // Latin extended and spacing modifiers
    ("OElig", '\u{0152}'), ("oelig", '\u{0153}'), ("Scaron", '\u{0160}'),
    ("scaron", '\u{0161}'), ("Yuml", '\u{0178}'), ("fnof", '\u{0192}'),
    ("circ", '\u{02C6}'), ("tilde", '\u{02DC}'),
    ("thetasym", '\u{03D1}'), ("upsih", '\u{03D2}'), ("piv", '\u{03D6}'),
    // Spaces, joiners and marks
    ("ensp", '\u{2002}'), ("emsp", '\u{2003}'), ("thinsp", '\u{2009}'),
    ("zwnj", '\u{200C}'), ("zwj", '\u{200D}'), ("lrm", '\u{200E}'), ("rlm", '\u{200F}'),
    // Punctuation
    ("ndash", '\u{2013}'), ("mdash", '\u{2014}'), ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'), ("sbquo", '\u{201A}'), ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'), ("bdquo", '\u{201E}'), ("dagger", '\u{2020}'),
    ("Dagger", '\u{2021}'), ("bull", '\u{2022}'), ("hellip", '\u{2026}'),
    ("permil", '\u{2030}'), ("prime", '\u{2032}'), ("Prime", '\u{2033}'),
    ("lsaquo", '\u{2039}'), ("rsaquo", '\u{203A}'), ("oline", '\u{203E}'),
    ("frasl", '\u{2044}'), ("euro", '\u{20AC}'),
    // Letterlike symbols
    ("image", '\u{2111}'), ("weierp", '\u{2118}'), ("real", '\u{211C}'),
    ("trade", '\u{2122}'), ("alefsym", '\u{2135}'),
    // Arrows
    ("larr", '\u{2190}'), ("uarr", '\u{2191}'), ("rarr", '\u{2192}'),
    ("darr", '\u{2193}'), ("harr", '\u{2194}'), ("crarr", '\u{21B5}'),
    ("lArr", '\u{21D0}'), ("uArr", '\u{21D1}'), ("rArr", '\u{21D2}'),
    ("dArr", '\u{21D3}'), ("hArr", '\u{21D4}'),
    // Mathematical operators
    ("forall", '\u{2200}'), ("part", '\u{2202}'), ("exist", '\u{2203}'),
    ("empty", '\u{2205}'), ("nabla", '\u{2207}'), ("isin", '\u{2208}'),
    ("notin", '\u{2209}'), ("ni", '\u{220B}'), ("prod", '\u{220F}'),
    ("sum", '\u{2211}'), ("minus", '\u{2212}'), ("lowast", '\u{2217}'),
    ("radic", '\u{221A}'), ("prop", '\u{221D}'), ("infin", '\u{221E}'),
    ("ang", '\u{2220}'), ("and", '\u{2227}'), ("or", '\u{2228}'),
    ("cap", '\u{2229}'), ("cup", '\u{222A}'), ("int", '\u{222B}'),
    ("there4", '\u{2234}'), ("sim", '\u{223C}'), ("cong", '\u{2245}'),
    ("asymp", '\u{2248}'), ("ne", '\u{2260}'), ("equiv", '\u{2261}'),
    ("le", '\u{2264}'), ("ge", '\u{2265}'), ("sub", '\u{2282}'),
    ("sup", '\u{2283}'), ("nsub", '\u{2284}'), ("sube", '\u{2286}'),
    ("supe", '\u{2287}'), ("oplus", '\u{2295}'), ("otimes", '\u{2297}'),
    ("perp", '\u{22A5}'), ("sdot", '\u{22C5}'),
    // Technical and geometric
    ("lceil", '\u{2308}'), ("rceil", '\u{2309}'), ("lfloor", '\u{230A}'),
    ("rfloor", '\u{230B}'), ("lang", '\u{2329}'), ("rang", '\u{232A}'),
    ("loz", '\u{25CA}'), ("spades", '\u{2660}'), ("clubs", '\u{2663}'),
    ("hearts", '\u{2665}'), ("diams", '\u{2666}'),
];

fn in_block(block: &[&str], first: u32, name: &str) -> Option<char> {
    let index = block.iter().position(|&entry| entry == name)?;
    char::from_u32(first + index as u32)
}

/// Character for an HTML entity name (without `&` and `;`)
pub fn lookup(name: &str) -> Option<char> {
    if name.is_empty() {
        return None;
    }

    in_block(&LATIN1, 0x00A0, name)
        .or_else(|| in_block(&GREEK_UPPER, 0x0391, name))
        .or_else(|| in_block(&GREEK_LOWER, 0x03B1, name))
        .or_else(|| {
            OTHER
                .iter()
                .find(|(entry, _)| *entry == name)
                .map(|&(_, c)| c)
        })
}

//! Text normalization for restaurant names.
//!
//! SQLite only folds ASCII case, so the mirror stores a folded copy of each
//! name for matching and a separate key for ordering.

/// Lowercase form used for case-insensitive substring matching.
pub fn fold_case(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Ordering key: lowercase with Latin diacritics reduced to their base
/// letter, so "Ébano" sorts between "Cote" and "Zuma".
pub fn sort_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    for c in fold_case(text).chars() {
        match base_letters(c) {
            Some(base) => key.push_str(base),
            None => key.push(c),
        }
    }
    key
}

fn base_letters(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}

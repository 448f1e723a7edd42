//! Numerus form selection
//!
//! Maps a count to the index of the `<numerusform>` to display, following the
//! plural rules Qt Linguist uses for each language.

/// Index of the numerus form for `n` items in `language`.
///
/// `language` may carry a territory (`zh_CN`, `pt-BR`); only the language
/// part matters except for Brazilian Portuguese.
pub fn plural_form(language: &str, n: usize) -> usize {
    let lang = language.split(['-', '_']).next().unwrap_or(language);

    match lang {
        // Single form
        "zh" | "ja" | "ko" | "vi" | "th" | "id" | "ms" | "tr" | "fa" | "ka" => 0,

        "fr" => usize::from(n > 1),

        "pt" => {
            if language.starts_with("pt_BR") || language.starts_with("pt-BR") {
                usize::from(n > 1)
            } else {
                usize::from(n != 1)
            }
        }

        // form 0: n%10==1 && n%100!=11
        // form 1: n%10 in 2..=4 && n%100 not in 10..20
        // form 2: everything else
        "ru" | "uk" | "be" | "sr" | "hr" | "bs" => {
            let n100 = n % 100;
            let n10 = n % 10;
            if n10 == 1 && n100 != 11 {
                0
            } else if (2..=4).contains(&n10) && !(10..20).contains(&n100) {
                1
            } else {
                2
            }
        }

        "pl" => {
            let n100 = n % 100;
            let n10 = n % 10;
            if n == 1 {
                0
            } else if (2..=4).contains(&n10) && !(10..20).contains(&n100) {
                1
            } else {
                2
            }
        }

        "cs" | "sk" => {
            if n == 1 {
                0
            } else if (2..=4).contains(&n) {
                1
            } else {
                2
            }
        }

        // Germanic default: singular for exactly one
        _ => usize::from(n != 1),
    }
}

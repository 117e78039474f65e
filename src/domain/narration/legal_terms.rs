//! Conversion tables used by the narration normalizer: ordinal words, Roman
//! numerals, and the legal abbreviation dictionary.

use once_cell::sync::Lazy;

const UNITS: [&str; 10] = [
    "", "primeiro", "segundo", "terceiro", "quarto", "quinto", "sexto", "sétimo", "oitavo",
    "nono",
];

const TENS: [&str; 10] = [
    "",
    "décimo",
    "vigésimo",
    "trigésimo",
    "quadragésimo",
    "quinquagésimo",
    "sexagésimo",
    "septuagésimo",
    "octogésimo",
    "nonagésimo",
];

const HUNDREDS: [&str; 10] = [
    "",
    "centésimo",
    "ducentésimo",
    "trecentésimo",
    "quadringentésimo",
    "quingentésimo",
    "sexcentésimo",
    "septingentésimo",
    "octingentésimo",
    "nongentésimo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Masculine,
    Feminine,
}

/// Spoken ordinal for 1..=999, e.g. 21 -> "vigésimo primeiro".
pub fn ordinal_words(n: u32, gender: Gender) -> Option<String> {
    if n == 0 || n > 999 {
        return None;
    }

    let words: Vec<String> = [
        HUNDREDS[(n / 100) as usize],
        TENS[((n / 10) % 10) as usize],
        UNITS[(n % 10) as usize],
    ]
    .iter()
    .filter(|w| !w.is_empty())
    .map(|w| match gender {
        Gender::Masculine => w.to_string(),
        // every masculine form ends in "o"
        Gender::Feminine => format!("{}a", &w[..w.len() - 1]),
    })
    .collect();

    Some(words.join(" "))
}

fn roman_value(c: char) -> Option<u32> {
    match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    }
}

pub fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, glyph) in TABLE {
        while n >= value {
            out.push_str(glyph);
            n -= value;
        }
    }
    out
}

/// Parses a canonical uppercase Roman numeral. Letter runs that only look like
/// numerals (acronyms such as "CDC" or "DLC") are rejected.
pub fn parse_roman(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }

    let values: Vec<u32> = s.chars().map(roman_value).collect::<Option<_>>()?;
    let mut total: i64 = 0;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total -= *value as i64,
            _ => total += *value as i64,
        }
    }

    if !(1..=3999).contains(&total) {
        return None;
    }
    let total = total as u32;
    (to_roman(total) == s).then_some(total)
}

/// Legal abbreviations and their spoken expansions. Matching is exact-case and
/// longest-first, so "CF/88" wins over "CF" and "REsp" over "RE".
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("Art.", "Artigo"),
    ("art.", "artigo"),
    ("Arts.", "Artigos"),
    ("arts.", "artigos"),
    ("nº", "número"),
    ("n°", "número"),
    ("n.º", "número"),
    ("Nº", "Número"),
    ("N°", "Número"),
    ("inc.", "inciso"),
    ("incs.", "incisos"),
    ("al.", "alínea"),
    ("p. ex.", "por exemplo"),
    ("e.g.", "por exemplo"),
    ("i.e.", "isto é"),
    ("c/c", "combinado com"),
    ("ss.", "seguintes"),
    ("Min.", "Ministro"),
    ("Rel.", "Relator"),
    ("Dec.", "Decreto"),
    ("Súm.", "Súmula"),
    ("CF/88", "Constituição Federal de 1988"),
    ("CF", "Constituição Federal"),
    ("CRFB", "Constituição da República Federativa do Brasil"),
    ("CPC", "Código de Processo Civil"),
    ("CPP", "Código de Processo Penal"),
    ("CP", "Código Penal"),
    ("CC", "Código Civil"),
    ("CLT", "Consolidação das Leis do Trabalho"),
    ("CDC", "Código de Defesa do Consumidor"),
    ("CTN", "Código Tributário Nacional"),
    ("CTB", "Código de Trânsito Brasileiro"),
    ("ECA", "Estatuto da Criança e do Adolescente"),
    ("LINDB", "Lei de Introdução às Normas do Direito Brasileiro"),
    ("LC", "Lei Complementar"),
    ("EC", "Emenda Constitucional"),
    ("STF", "Supremo Tribunal Federal"),
    ("STJ", "Superior Tribunal de Justiça"),
    ("TST", "Tribunal Superior do Trabalho"),
    ("TSE", "Tribunal Superior Eleitoral"),
    ("STM", "Superior Tribunal Militar"),
    ("TRF", "Tribunal Regional Federal"),
    ("TRT", "Tribunal Regional do Trabalho"),
    ("TJ", "Tribunal de Justiça"),
    ("MP", "Ministério Público"),
    ("OAB", "Ordem dos Advogados do Brasil"),
    ("ADI", "Ação Direta de Inconstitucionalidade"),
    ("ADC", "Ação Declaratória de Constitucionalidade"),
    ("ADPF", "Arguição de Descumprimento de Preceito Fundamental"),
    ("HC", "habeas corpus"),
    ("MS", "mandado de segurança"),
    ("REsp", "Recurso Especial"),
    ("RE", "Recurso Extraordinário"),
    ("DJe", "Diário da Justiça Eletrônico"),
];

/// Dictionary entries ordered longest pattern first.
pub static ABBREVIATIONS_BY_LENGTH: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut entries = ABBREVIATIONS.to_vec();
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    entries
});

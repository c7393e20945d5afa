//! Vocabulary dictionary - masked five-letter words
//!
//! Each entry stores the full word, the masked spelling shown to players,
//! the 1-based index of the correct letter, and the three candidate letters.

/// A dictionary entry for a vocabulary question
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub word: &'static str,
    pub masked: &'static str,
    pub answer: u8,
    pub options: [&'static str; 3],
}

const fn entry(
    word: &'static str,
    masked: &'static str,
    answer: u8,
    options: [&'static str; 3],
) -> WordEntry {
    WordEntry { word, masked, answer, options }
}

pub const WORDS: [WordEntry; 57] = [
    entry("APPLE", "A_PLE", 2, ["R", "P", "S"]),
    entry("TIGER", "TI_ER", 3, ["A", "I", "G"]),
    entry("HOUSE", "HO_SE", 1, ["U", "A", "E"]),
    entry("WATER", "WA_ER", 3, ["P", "D", "T"]),
    entry("CLOUD", "CL_UD", 3, ["A", "I", "O"]),
    entry("ROBOT", "ROB_T", 3, ["A", "I", "O"]),
    entry("MUSIC", "MUS_C", 2, ["K", "I", "E"]),
    entry("PHONE", "PH_NE", 3, ["A", "U", "O"]),
    entry("CHAIR", "CH_IR", 1, ["A", "E", "I"]),
    entry("BREAD", "BR_AD", 2, ["O", "E", "A"]),
    entry("EARTH", "E_RTH", 1, ["A", "O", "U"]),
    entry("MONEY", "MON_Y", 2, ["I", "E", "A"]),
    entry("LEMON", "LE_ON", 2, ["N", "M", "W"]),
    entry("RIVER", "RIV_R", 2, ["A", "E", "I"]),
    entry("STONE", "ST_NE", 2, ["A", "O", "I"]),
    entry("HAPPY", "HA_PY", 1, ["P", "B", "D"]),
    entry("GREEN", "GR_EN", 3, ["I", "A", "E"]),
    entry("SMILE", "SM_LE", 1, ["I", "A", "Y"]),
    entry("BEACH", "BEA_H", 2, ["S", "C", "T"]),
    entry("NIGHT", "NI_HT", 1, ["G", "F", "H"]),
    entry("PIZZA", "PI_ZA", 2, ["S", "Z", "X"]),
    entry("TRAIN", "TR_IN", 2, ["E", "A", "I"]),
    entry("SNACK", "SNA_K", 1, ["C", "K", "S"]),
    entry("GHOST", "GH_ST", 3, ["A", "I", "O"]),
    entry("MOUSE", "MO_SE", 2, ["O", "U", "A"]),
    entry("CLOCK", "CL_CK", 2, ["A", "O", "U"]),
    entry("PLANT", "PL_NT", 3, ["E", "I", "A"]),
    entry("SPACE", "SP_CE", 3, ["E", "I", "A"]),
    entry("WORLD", "WO_LD", 1, ["R", "L", "D"]),
    entry("TABLE", "TA_LE", 2, ["P", "B", "D"]),
    entry("FLOOR", "FL_OR", 2, ["A", "O", "U"]),
    entry("SHOES", "SH_ES", 1, ["O", "A", "I"]),
    entry("SHIRT", "SH_RT", 3, ["A", "E", "I"]),
    entry("PANTS", "PA_TS", 2, ["M", "N", "S"]),
    entry("FRUIT", "FR_IT", 3, ["O", "I", "U"]),
    entry("GRAPE", "GR_PE", 3, ["E", "I", "A"]),
    entry("MELON", "M_LON", 3, ["A", "I", "E"]),
    entry("BERRY", "BE_RY", 1, ["R", "L", "T"]),
    entry("ONION", "ON_ON", 2, ["E", "I", "A"]),
    entry("SALAD", "SA_AD", 2, ["R", "L", "T"]),
    entry("PASTA", "PA_TA", 1, ["S", "Z", "C"]),
    entry("TOAST", "TO_ST", 3, ["O", "E", "A"]),
    entry("LUNCH", "LU_CH", 2, ["M", "N", "R"]),
    entry("SPORT", "SP_RT", 2, ["A", "O", "U"]),
    entry("RUGBY", "RU_BY", 1, ["G", "J", "D"]),
    entry("START", "ST_RT", 3, ["E", "O", "A"]),
    entry("FIRST", "F_RST", 3, ["A", "E", "I"]),
    entry("THIRD", "TH_RD", 2, ["E", "I", "U"]),
    entry("BLACK", "BL_CK", 3, ["E", "O", "A"]),
    entry("WHITE", "WH_TE", 3, ["A", "E", "I"]),
    entry("BROWN", "BR_WN", 2, ["A", "O", "U"]),
    entry("HEAVY", "HE_VY", 3, ["E", "I", "A"]),
    entry("LIGHT", "LI_HT", 1, ["G", "F", "H"]),
    entry("CLEAN", "CL_AN", 3, ["I", "A", "E"]),
    entry("DIRTY", "DI_TY", 1, ["R", "L", "T"]),
    entry("QUICK", "QU_CK", 3, ["A", "E", "I"]),
    entry("SMART", "SMA_T", 1, ["R", "L", "N"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_word_matches_full_word() {
        for entry in WORDS.iter() {
            let blank = entry.masked.find('_').expect("every entry has a blank");
            let letter = entry.options[(entry.answer - 1) as usize];
            let rebuilt = format!(
                "{}{}{}",
                &entry.masked[..blank],
                letter,
                &entry.masked[blank + 1..]
            );
            assert_eq!(rebuilt, entry.word, "bad entry {}", entry.word);
        }
    }

    #[test]
    fn test_answers_are_one_based() {
        assert!(WORDS.iter().all(|e| (1..=3).contains(&e.answer)));
    }
}

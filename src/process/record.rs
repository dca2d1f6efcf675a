use super::kana::kana_reading;
use super::rows::{
    PhysicalRow, KANA_CITY_TOWN, KANA_PREFECTURE, KANA_STREET, KANJI_CITY_TOWN,
    KANJI_PREFECTURE, KANJI_STREET,
};

/// One complete postal-code entry, possibly stitched from several source rows.
///
/// Field order matches the destination table columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRecord {
    pub postal_code: String,
    pub kana_prefecture: String,
    pub kana_city_town: String,
    pub kana_street: String,
    pub kanji_prefecture: String,
    pub kanji_city_town: String,
    pub kanji_street: String,
}

impl LogicalRecord {
    /// Build a record from the first row of an entry, deriving the kana readings.
    pub fn from_row(row: &PhysicalRow) -> Self {
        Self {
            postal_code: row.postal_code().to_string(),
            kana_prefecture: kana_reading(row.field(KANA_PREFECTURE)),
            kana_city_town: kana_reading(row.field(KANA_CITY_TOWN)),
            kana_street: kana_reading(row.field(KANA_STREET)),
            kanji_prefecture: row.field(KANJI_PREFECTURE).to_string(),
            kanji_city_town: row.field(KANJI_CITY_TOWN).to_string(),
            kanji_street: row.field(KANJI_STREET).to_string(),
        }
    }

    /// Append a continuation row's street fragments. Nothing else changes.
    pub fn append_street(&mut self, row: &PhysicalRow) {
        self.kana_street.push_str(&kana_reading(row.kana_street()));
        self.kanji_street.push_str(row.kanji_street());
    }

    /// Column values in table order.
    pub fn columns(&self) -> [&str; 7] {
        [
            self.postal_code.as_str(),
            self.kana_prefecture.as_str(),
            self.kana_city_town.as_str(),
            self.kana_street.as_str(),
            self.kanji_prefecture.as_str(),
            self.kanji_city_town.as_str(),
            self.kanji_street.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::rows::{parse_rows, tests::source_line};
    use anyhow::Result;

    #[test]
    fn kana_fields_are_hiragana_kanji_verbatim() -> Result<()> {
        let text = source_line(
            "1010021",
            ["ﾄｳｷｮｳﾄ", "ﾁﾖﾀﾞｸ", "ｿﾄｶﾝﾀﾞ"],
            ["東京都", "千代田区", "外神田"],
        );
        let rows = parse_rows(&text)?;
        let rec = LogicalRecord::from_row(&rows[0]);
        assert_eq!(
            rec,
            LogicalRecord {
                postal_code: "1010021".into(),
                kana_prefecture: "とうきょうと".into(),
                kana_city_town: "ちよだく".into(),
                kana_street: "そとかんだ".into(),
                kanji_prefecture: "東京都".into(),
                kanji_city_town: "千代田区".into(),
                kanji_street: "外神田".into(),
            }
        );
        assert_eq!(rec.columns()[0], "1010021");
        assert_eq!(rec.columns()[6], "外神田");
        Ok(())
    }

    #[test]
    fn append_street_keeps_other_fields() -> Result<()> {
        let mut text = source_line("1000001", ["ﾄｳｷｮｳﾄ", "ﾁﾖﾀﾞｸ", "ﾁﾖﾀﾞ("], ["東京都", "千代田区", "千代田（"]);
        text.push_str(&source_line("9999999", ["ﾎｯｶｲﾄﾞｳ", "ｻｯﾎﾟﾛｼ", "ﾊﾞﾝﾁ)"], ["北海道", "札幌市", "番地）"]));
        let rows = parse_rows(&text)?;

        let mut rec = LogicalRecord::from_row(&rows[0]);
        rec.append_street(&rows[1]);
        assert_eq!(rec.postal_code, "1000001");
        assert_eq!(rec.kanji_prefecture, "東京都");
        assert_eq!(rec.kana_city_town, "ちよだく");
        assert_eq!(rec.kana_street, "ちよだ(ばんち)");
        assert_eq!(rec.kanji_street, "千代田（番地）");
        Ok(())
    }
}

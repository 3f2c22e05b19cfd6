//! Static ISO reference tables used by several message types.

/// ISO 4217 numeric code, alphabetic code, minor-unit exponent.
const CURRENCIES: &[(&str, &str, u32)] = &[
    ("008", "ALL", 2),
    ("012", "DZD", 2),
    ("032", "ARS", 2),
    ("036", "AUD", 2),
    ("044", "BSD", 2),
    ("048", "BHD", 3),
    ("050", "BDT", 2),
    ("051", "AMD", 2),
    ("052", "BBD", 2),
    ("060", "BMD", 2),
    ("064", "BTN", 2),
    ("068", "BOB", 2),
    ("072", "BWP", 2),
    ("084", "BZD", 2),
    ("090", "SBD", 2),
    ("096", "BND", 2),
    ("104", "MMK", 2),
    ("108", "BIF", 0),
    ("116", "KHR", 2),
    ("124", "CAD", 2),
    ("132", "CVE", 2),
    ("136", "KYD", 2),
    ("144", "LKR", 2),
    ("152", "CLP", 0),
    ("156", "CNY", 2),
    ("170", "COP", 2),
    ("174", "KMF", 0),
    ("188", "CRC", 2),
    ("191", "HRK", 2),
    ("192", "CUP", 2),
    ("203", "CZK", 2),
    ("208", "DKK", 2),
    ("214", "DOP", 2),
    ("222", "SVC", 2),
    ("230", "ETB", 2),
    ("232", "ERN", 2),
    ("238", "FKP", 2),
    ("242", "FJD", 2),
    ("262", "DJF", 0),
    ("270", "GMD", 2),
    ("292", "GIP", 2),
    ("320", "GTQ", 2),
    ("324", "GNF", 0),
    ("328", "GYD", 2),
    ("332", "HTG", 2),
    ("340", "HNL", 2),
    ("344", "HKD", 2),
    ("348", "HUF", 2),
    ("352", "ISK", 0),
    ("356", "INR", 2),
    ("360", "IDR", 2),
    ("364", "IRR", 2),
    ("368", "IQD", 3),
    ("376", "ILS", 2),
    ("388", "JMD", 2),
    ("392", "JPY", 0),
    ("398", "KZT", 2),
    ("400", "JOD", 3),
    ("404", "KES", 2),
    ("408", "KPW", 2),
    ("410", "KRW", 0),
    ("414", "KWD", 3),
    ("417", "KGS", 2),
    ("418", "LAK", 2),
    ("422", "LBP", 2),
    ("426", "LSL", 2),
    ("430", "LRD", 2),
    ("434", "LYD", 3),
    ("446", "MOP", 2),
    ("454", "MWK", 2),
    ("458", "MYR", 2),
    ("462", "MVR", 2),
    ("480", "MUR", 2),
    ("484", "MXN", 2),
    ("496", "MNT", 2),
    ("498", "MDL", 2),
    ("504", "MAD", 2),
    ("512", "OMR", 3),
    ("516", "NAD", 2),
    ("524", "NPR", 2),
    ("532", "ANG", 2),
    ("533", "AWG", 2),
    ("548", "VUV", 0),
    ("554", "NZD", 2),
    ("558", "NIO", 2),
    ("566", "NGN", 2),
    ("578", "NOK", 2),
    ("586", "PKR", 2),
    ("590", "PAB", 2),
    ("598", "PGK", 2),
    ("600", "PYG", 0),
    ("604", "PEN", 2),
    ("608", "PHP", 2),
    ("634", "QAR", 2),
    ("643", "RUB", 2),
    ("646", "RWF", 0),
    ("654", "SHP", 2),
    ("682", "SAR", 2),
    ("690", "SCR", 2),
    ("694", "SLL", 2),
    ("702", "SGD", 2),
    ("704", "VND", 0),
    ("706", "SOS", 2),
    ("710", "ZAR", 2),
    ("728", "SSP", 2),
    ("748", "SZL", 2),
    ("752", "SEK", 2),
    ("756", "CHF", 2),
    ("760", "SYP", 2),
    ("764", "THB", 2),
    ("776", "TOP", 2),
    ("780", "TTD", 2),
    ("784", "AED", 2),
    ("788", "TND", 3),
    ("800", "UGX", 0),
    ("807", "MKD", 2),
    ("818", "EGP", 2),
    ("826", "GBP", 2),
    ("834", "TZS", 2),
    ("840", "USD", 2),
    ("858", "UYU", 2),
    ("860", "UZS", 2),
    ("882", "WST", 2),
    ("886", "YER", 2),
    ("901", "TWD", 2),
    ("925", "SLE", 2),
    ("927", "UYW", 4),
    ("928", "VES", 2),
    ("929", "MRU", 2),
    ("930", "STN", 2),
    ("933", "BYN", 2),
    ("934", "TMT", 2),
    ("936", "GHS", 2),
    ("938", "SDG", 2),
    ("940", "UYI", 0),
    ("941", "RSD", 2),
    ("943", "MZN", 2),
    ("944", "AZN", 2),
    ("946", "RON", 2),
    ("947", "CHE", 2),
    ("948", "CHW", 2),
    ("949", "TRY", 2),
    ("950", "XAF", 0),
    ("951", "XCD", 2),
    ("952", "XOF", 0),
    ("953", "XPF", 0),
    ("967", "ZMW", 2),
    ("968", "SRD", 2),
    ("969", "MGA", 2),
    ("970", "COU", 2),
    ("971", "AFN", 2),
    ("972", "TJS", 2),
    ("973", "AOA", 2),
    ("975", "BGN", 2),
    ("976", "CDF", 2),
    ("977", "BAM", 2),
    ("978", "EUR", 2),
    ("979", "MXV", 2),
    ("980", "UAH", 2),
    ("981", "GEL", 2),
    ("984", "BOV", 2),
    ("985", "PLN", 2),
    ("986", "BRL", 2),
    ("990", "CLF", 4),
    ("997", "USN", 2),
];

/// ISO 3166-1 numeric country codes.
const COUNTRIES: &[&str] = &[
    "004", "008", "010", "012", "016", "020", "024", "028", "031", "032", "036", "040", "044",
    "048", "050", "051", "052", "056", "060", "064", "068", "070", "072", "074", "076", "084",
    "086", "090", "092", "096", "100", "104", "108", "112", "116", "120", "124", "132", "136",
    "140", "144", "148", "152", "156", "158", "162", "166", "170", "174", "175", "178", "180",
    "184", "188", "191", "192", "196", "203", "204", "208", "212", "214", "218", "222", "226",
    "231", "232", "233", "234", "238", "239", "242", "246", "248", "250", "254", "258", "260",
    "262", "266", "268", "270", "275", "276", "288", "292", "296", "300", "304", "308", "312",
    "316", "320", "324", "328", "332", "334", "336", "340", "344", "348", "352", "356", "360",
    "364", "368", "372", "376", "380", "384", "388", "392", "398", "400", "404", "408", "410",
    "414", "417", "418", "422", "426", "428", "430", "434", "438", "440", "442", "446", "450",
    "454", "458", "462", "466", "470", "474", "478", "480", "484", "492", "496", "498", "499",
    "500", "504", "508", "512", "516", "520", "524", "528", "531", "533", "534", "535", "540",
    "548", "554", "558", "562", "566", "570", "574", "578", "580", "581", "583", "584", "585",
    "586", "591", "598", "600", "604", "608", "612", "616", "620", "624", "626", "630", "634",
    "638", "642", "643", "646", "652", "654", "659", "660", "662", "663", "666", "670", "674",
    "678", "682", "686", "688", "690", "694", "702", "703", "704", "705", "706", "710", "716",
    "724", "728", "729", "732", "740", "744", "748", "752", "756", "760", "762", "764", "768",
    "772", "776", "780", "784", "788", "792", "795", "796", "798", "800", "804", "807", "818",
    "826", "831", "832", "833", "834", "840", "850", "854", "858", "860", "862", "876", "882",
    "887", "894",
];

/// Protocol error codes defined for `Error` messages. Only consulted for
/// logging: unknown codes are accepted for interoperability.
pub const KNOWN_ERROR_CODES: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "50", "51", "52", "53", "70", "71", "96", "98", "99",
];

pub fn is_known_currency(code: &str) -> bool {
    CURRENCIES.iter().any(|(numeric, _, _)| *numeric == code)
}

pub fn currency_exponent(code: &str) -> Option<u32> {
    CURRENCIES
        .iter()
        .find(|(numeric, _, _)| *numeric == code)
        .map(|(_, _, exponent)| *exponent)
}

pub fn currency_alpha(code: &str) -> Option<&'static str> {
    CURRENCIES
        .iter()
        .find(|(numeric, _, _)| *numeric == code)
        .map(|(_, alpha, _)| *alpha)
}

pub fn is_known_country(code: &str) -> bool {
    COUNTRIES.contains(&code)
}

pub fn is_known_error_code(code: &str) -> bool {
    KNOWN_ERROR_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_lookup() {
        assert_eq!(currency_exponent("840"), Some(2));
        assert_eq!(currency_exponent("392"), Some(0));
        assert_eq!(currency_exponent("048"), Some(3));
        assert_eq!(currency_alpha("978"), Some("EUR"));
        assert!(!is_known_currency("999"));
        assert_eq!(currency_exponent("12"), None);
    }

    #[test]
    fn test_country_lookup() {
        assert!(is_known_country("840"));
        assert!(is_known_country("826"));
        assert!(!is_known_country("000"));
    }

    #[test]
    fn test_currency_codes_are_unique() {
        let mut codes: Vec<&str> = CURRENCIES.iter().map(|(code, _, _)| *code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), CURRENCIES.len());
    }
}

//! Built-in airline ICAO designator table.
//!
//! Covers the airlines most commonly seen in European/UK airspace,
//! sourced from public ICAO designator lists. Used by the enrichment
//! engine's callsign-prefix step when no richer source has already
//! named the operator.

/// Airline ICAO code → display name, sorted by code.
#[rustfmt::skip]
pub const AIRLINE_ICAO_MAP: &[(&str, &str)] = &[
    ("AAL", "AMERICAN AIRLINES"), ("AAR", "ASIANA"), ("ACA", "AIR CANADA"),
    ("AFR", "AIR FRANCE"), ("AIC", "AIR INDIA"), ("AMX", "AEROMEXICO"),
    ("ANA", "ALL NIPPON AIRWAYS"), ("ASA", "ALASKA AIRLINES"),
    ("AUA", "AUSTRIAN"), ("AUI", "UKRAINE INTL"), ("AZA", "ALITALIA"),
    ("BAW", "BRITISH AIRWAYS"), ("BCS", "EUROPEAN AIR CHARTER"),
    ("BEE", "BEE LINE"), ("BEL", "BRUSSELS AIRLINES"),
    ("BER", "GERMANIA"), ("BOX", "AEROLOGIC"),
    ("CAL", "CHINA AIRLINES"), ("CCA", "AIR CHINA"),
    ("CES", "CHINA EASTERN"), ("CFG", "CONDOR"),
    ("CLH", "LUFTHANSA CARGO"), ("CPA", "CATHAY PACIFIC"),
    ("CSN", "CHINA SOUTHERN"), ("CTN", "CROATIA AIRLINES"),
    ("CXA", "XIAMEN AIR"), ("DAL", "DELTA"),
    ("DLH", "LUFTHANSA"), ("EAL", "EASTERN AIRWAYS"),
    ("EDW", "EDELWEISS AIR"), ("EIN", "AER LINGUS"),
    ("EJU", "EASYJET EUROPE"), ("ELY", "EL AL"),
    ("ETD", "ETIHAD"), ("ETH", "ETHIOPIAN"),
    ("EVA", "EVA AIR"), ("EWG", "EUROWINGS"),
    ("EXS", "JET2"), ("EZE", "EASYJET EUROPE"),
    ("EZS", "EASYJET SWITZERLAND"), ("EZY", "EASYJET"),
    ("FDB", "FLYDUBAI"), ("FDX", "FEDEX"),
    ("FIN", "FINNAIR"), ("GEC", "LUFTHANSA CARGO"),
    ("GIA", "GARUDA"), ("GTI", "ATLAS AIR"),
    ("GWI", "GERMANWINGS"), ("HAL", "HAWAIIAN"),
    ("HVN", "VIETNAM AIRLINES"), ("IBE", "IBERIA"),
    ("IBK", "NORWEGIAN"), ("ICE", "ICELANDAIR"),
    ("JAL", "JAPAN AIRLINES"), ("JBU", "JETBLUE"),
    ("KAL", "KOREAN AIR"), ("KLM", "KLM"),
    ("KQA", "KENYA AIRWAYS"), ("LAN", "LATAM CHILE"),
    ("LOG", "LOGANAIR"), ("LOT", "LOT POLISH"),
    ("LZB", "WIZZ AIR"), ("MAH", "MALEV"),
    ("MAS", "MALAYSIA AIRLINES"), ("MSR", "EGYPTAIR"),
    ("NAX", "NORWEGIAN"), ("NKS", "SPIRIT AIRLINES"),
    ("NOZ", "NORWEGIAN AIR"), ("NPT", "WEST ATLANTIC"),
    ("OAL", "OLYMPIC"), ("PAC", "POLAR AIR CARGO"),
    ("PGT", "PEGASUS"), ("PIA", "PIA"),
    ("QFA", "QANTAS"), ("QTR", "QATAR AIRWAYS"),
    ("RAM", "ROYAL AIR MAROC"), ("ROT", "TAROM"),
    ("RYR", "RYANAIR"), ("RZO", "SAUDIA"),
    ("SAA", "SOUTH AFRICAN"), ("SAS", "SAS"),
    ("SIA", "SINGAPORE AIRLINES"), ("SKW", "SKYWEST"),
    ("SLK", "SILK AIR"), ("SQC", "SINGAPORE CARGO"),
    ("SWA", "SOUTHWEST"), ("SWR", "SWISS"),
    ("TAM", "LATAM BRASIL"), ("TAP", "TAP PORTUGAL"),
    ("THA", "THAI"), ("THY", "TURKISH AIRLINES"),
    ("TOM", "TUI"), ("TSC", "AIR TRANSAT"),
    ("TUI", "TUI FLY"), ("TVF", "TRANSAVIA FRANCE"),
    ("UAE", "EMIRATES"), ("UAL", "UNITED"),
    ("UPS", "UPS"), ("UZB", "UZBEKISTAN AIRWAYS"),
    ("VIR", "VIRGIN ATLANTIC"), ("VLG", "VUELING"),
    ("VOE", "VOLOTEA"), ("VOI", "VOLARIS"),
    ("VTG", "VOLGA-DNEPR"), ("WJA", "WESTJET"),
    ("WUK", "WIZZ AIR UK"), ("WZZ", "WIZZ AIR"),
];

/// Look up an airline name by 3-letter ICAO prefix.
pub fn airline_for_prefix(prefix: &str) -> Option<&'static str> {
    AIRLINE_ICAO_MAP
        .binary_search_by_key(&prefix, |(code, _)| code)
        .ok()
        .map(|i| AIRLINE_ICAO_MAP[i].1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in AIRLINE_ICAO_MAP.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_known_prefixes() {
        assert_eq!(airline_for_prefix("BAW"), Some("BRITISH AIRWAYS"));
        assert_eq!(airline_for_prefix("RYR"), Some("RYANAIR"));
        assert_eq!(airline_for_prefix("UAE"), Some("EMIRATES"));
    }

    #[test]
    fn test_unknown_prefix() {
        assert_eq!(airline_for_prefix("ZZZ"), None);
        assert_eq!(airline_for_prefix(""), None);
    }
}

#![no_main]
use country_pack::{ActiveLocale, BlockKind, CountrySys, WILDCARD_CODEPAGE, WILDCARD_COUNTRY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let sys = match CountrySys::new(data) {
        Ok(sys) => sys,
        Err(_) => return,
    };
    let active = ActiveLocale::default();
    let _ = sys.trailer();
    let _ = sys.lookup(WILDCARD_COUNTRY, WILDCARD_CODEPAGE, &active);
    for locale in sys.locales().take(256) {
        let (_, header) = match locale {
            Ok(v) => v,
            Err(_) => break,
        };
        for kind in BlockKind::ALL {
            let _ = header.get(kind);
        }
    }
});

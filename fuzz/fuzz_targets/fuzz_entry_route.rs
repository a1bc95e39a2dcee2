#![no_main]

use libfuzzer_sys::fuzz_target;
use parallax_types::{EntryRoute, SessionId, Verdict, VerificationStatus};
use url::Url;

fuzz_target!(|data: &[u8]| {
    // Entry URLs come straight from whoever constructed the verification
    // link, so routing has to shrug off arbitrary query strings. When the
    // query yields a usable return URL, building the completion redirect
    // from it must not panic either.
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(entry) = Url::parse(&format!("https://verify.example.com/?{query}")) else {
        return;
    };
    if let EntryRoute::Verify(params) = EntryRoute::from_url(&entry) {
        if let Some(return_url) = params.return_url {
            let verdict = Verdict {
                status: VerificationStatus::Success,
                trust_score: 92.0,
                correlation: None,
                reasoning: None,
            };
            let _ = parallax_client::completion_url(&return_url, &params.session_id, &verdict);
            let _ = SessionId::new(params.session_id.as_str());
        }
    }
});

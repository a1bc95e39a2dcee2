//! Return-URL construction for managed flows.

use parallax_types::{SessionId, Verdict};
use url::Url;

/// Append the session outcome to the tenant's return URL.
///
/// Existing query pairs on the return URL survive; the outcome pairs go on
/// the end. Scores format through `f64`'s `Display`, so integral scores
/// read as integers (`trust_score=92`, not `92.0`).
pub fn completion_url(return_url: &Url, session_id: &SessionId, verdict: &Verdict) -> Url {
    let mut url = return_url.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("session_id", session_id.as_str());
        pairs.append_pair("status", verdict.status.as_str());
        pairs.append_pair("trust_score", &verdict.trust_score.to_string());
        if let Some(correlation) = verdict.correlation {
            pairs.append_pair("correlation", &correlation.to_string());
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_types::VerificationStatus;

    fn verdict(status: VerificationStatus, trust_score: f64, correlation: Option<f64>) -> Verdict {
        Verdict {
            status,
            trust_score,
            correlation,
            reasoning: None,
        }
    }

    #[test]
    fn success_appends_the_contract_pairs() {
        let url = completion_url(
            &Url::parse("https://merchant.example.com/done").unwrap(),
            &SessionId::new("sess-1"),
            &verdict(VerificationStatus::Success, 92.0, None),
        );
        assert_eq!(
            url.as_str(),
            "https://merchant.example.com/done?session_id=sess-1&status=success&trust_score=92"
        );
    }

    #[test]
    fn correlation_rides_along_when_present() {
        let url = completion_url(
            &Url::parse("https://merchant.example.com/done").unwrap(),
            &SessionId::new("sess-2"),
            &verdict(VerificationStatus::Failure, 14.5, Some(0.12)),
        );
        assert_eq!(
            url.as_str(),
            "https://merchant.example.com/done?session_id=sess-2&status=failure&trust_score=14.5&correlation=0.12"
        );
    }

    #[test]
    fn existing_query_pairs_are_preserved() {
        let url = completion_url(
            &Url::parse("https://merchant.example.com/done?order=77").unwrap(),
            &SessionId::new("sess-3"),
            &verdict(VerificationStatus::Success, 88.0, None),
        );
        assert_eq!(
            url.as_str(),
            "https://merchant.example.com/done?order=77&session_id=sess-3&status=success&trust_score=88"
        );
    }
}

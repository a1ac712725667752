use serde::Serialize;

/// External help for users dealing with losses or scams
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportResource {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

const PREVENTION_TIPS: &[&str] = &[
    "Never share your seed phrase or private keys with anyone",
    "Use a hardware wallet for long-term holdings",
    "Verify contract addresses from official sources before interacting",
    "Review and revoke unused token approvals regularly",
    "Keep any single position below a quarter of your portfolio",
    "Be wary of tokens promising guaranteed or unusually high returns",
    "Prefer audited protocols with a long operating history",
    "Keep part of your portfolio in liquid assets you can exit quickly",
];

const SUPPORT_RESOURCES: &[SupportResource] = &[
    SupportResource {
        title: "Revoke.cash",
        description: "Inspect and revoke token approvals across chains",
        url: "https://revoke.cash",
    },
    SupportResource {
        title: "Chainabuse",
        description: "Report and look up scam addresses",
        url: "https://www.chainabuse.com",
    },
    SupportResource {
        title: "Etherscan Token Approvals",
        description: "Check which contracts can spend your tokens",
        url: "https://etherscan.io/tokenapprovalchecker",
    },
    SupportResource {
        title: "FTC Fraud Report",
        description: "Report cryptocurrency fraud to the US Federal Trade Commission",
        url: "https://reportfraud.ftc.gov",
    },
];

/// Fixed list of risk prevention tips
pub fn risk_prevention_tips() -> Vec<&'static str> {
    PREVENTION_TIPS.to_vec()
}

/// Fixed list of support resources
pub fn risk_support_resources() -> Vec<SupportResource> {
    SUPPORT_RESOURCES.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_fixed() {
        assert_eq!(risk_prevention_tips(), risk_prevention_tips());
        assert_eq!(risk_support_resources(), risk_support_resources());
        assert!(!risk_prevention_tips().is_empty());
    }

    #[test]
    fn resources_link_over_https() {
        for resource in risk_support_resources() {
            assert!(resource.url.starts_with("https://"), "{}", resource.title);
            assert!(!resource.description.is_empty());
        }
    }
}

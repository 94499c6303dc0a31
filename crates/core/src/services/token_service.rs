use rand::rngs::OsRng;
use rand::Rng;

const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// Source of recharge tokens used when a purchase settles.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> String;
}

/// Issues tokens from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenIssuer;

impl TokenIssuer for RandomTokenIssuer {
    fn issue(&self) -> String {
        TokenService::generate()
    }
}

pub struct TokenService;

impl TokenService {
    /// Sixteen random decimal digits as `DDDD-DDDD-DDDD-DDDD`.
    ///
    /// Uniqueness is enforced by the store when the token is recorded.
    pub fn generate() -> String {
        let mut rng = OsRng;
        let mut token = String::with_capacity(GROUPS * GROUP_LEN + GROUPS - 1);

        for group in 0..GROUPS {
            if group > 0 {
                token.push('-');
            }
            for _ in 0..GROUP_LEN {
                let digit = rng.gen_range(0..10u32);
                token.push(char::from_digit(digit, 10).unwrap_or('0'));
            }
        }

        token
    }

    pub fn is_well_formed(token: &str) -> bool {
        let groups: Vec<&str> = token.split('-').collect();
        groups.len() == GROUPS
            && groups
                .iter()
                .all(|g| g.len() == GROUP_LEN && g.chars().all(|c| c.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_tokens_are_well_formed() {
        for _ in 0..100 {
            let token = TokenService::generate();
            assert_eq!(token.len(), 19);
            assert!(TokenService::is_well_formed(&token), "bad token {}", token);
        }
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(TokenService::is_well_formed("1234-5678-9012-3456"));
        assert!(!TokenService::is_well_formed("1234-5678-9012"));
        assert!(!TokenService::is_well_formed("1234-5678-9012-345a"));
        assert!(!TokenService::is_well_formed("12345-678-9012-3456"));
    }

    #[test]
    fn random_issuer_yields_well_formed_tokens() {
        let issuer: &dyn TokenIssuer = &RandomTokenIssuer;
        let a = issuer.issue();
        let b = issuer.issue();
        assert!(TokenService::is_well_formed(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn tokens_rarely_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| TokenService::generate()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}

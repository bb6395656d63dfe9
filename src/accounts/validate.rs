use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // local-part "@" dotted labels "." TLD of 2-4 chars
    static ref EMAIL_RE: Regex = Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").unwrap();
    // ten digits, no leading zero
    static ref CONTACT_RE: Regex = Regex::new(r"^[1-9][0-9]{9}$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_contact(contact: &str) -> bool {
    CONTACT_RE.is_match(contact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_emails() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("first.last-name@mail.co.in"));
        assert!(is_valid_email("a_b@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email("user@example.abcdef"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn contact_must_be_ten_digits_without_leading_zero() {
        assert!(is_valid_contact("9123456789"));
        assert!(!is_valid_contact("0123456789"));
        assert!(!is_valid_contact("12345"));
        assert!(!is_valid_contact("91234567890"));
        assert!(!is_valid_contact("912345678a"));
    }
}

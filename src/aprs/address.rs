use std::{fmt, str::FromStr};

use crate::ParseError;

/// Максимальная длина позывного (с учётом q-конструкций APRS-IS).
pub const MAX_CALL_LEN: usize = 9;
/// Максимальный SSID, который помещается в AX.25 адрес.
pub const MAX_SSID: u8 = 15;

/// Радиопозывной с необязательным SSID.
///
/// Равенство структурное: `N0CALL-1` и `N0CALL-1*` различаются, так как
/// флаг ретрансляции является частью адреса в пути.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    call: String,
    ssid: u8,
    digipeated: bool,
}

impl Address {
    /// Создаёт адрес без проверки формата позывного.
    pub fn new(
        call: impl Into<String>,
        ssid: u8,
    ) -> Self {
        Self {
            call: call.into(),
            ssid,
            digipeated: false,
        }
    }

    /// Возвращает копию адреса с выставленным флагом ретрансляции (`*`).
    pub fn with_digipeated(
        mut self,
        digipeated: bool,
    ) -> Self {
        self.digipeated = digipeated;
        self
    }

    pub fn call(&self) -> &str {
        &self.call
    }

    pub fn ssid(&self) -> u8 {
        self.ssid
    }

    pub fn is_digipeated(&self) -> bool {
        self.digipeated
    }

    /// Сравнивает только позывной, без SSID и регистра.
    pub fn same_call(
        &self,
        call: &str,
    ) -> bool {
        self.call.eq_ignore_ascii_case(call)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (s, digipeated) = match s.strip_suffix('*') {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        // Числовой суффикс после последнего '-' является SSID. Иначе весь
        // токен считается позывным (встречается у APRS-IS).
        let (call, ssid) = match s.rsplit_once('-') {
            Some((call, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
                let ssid: u8 = suffix
                    .parse()
                    .map_err(|_| ParseError::InvalidSsid(s.to_string()))?;
                if ssid > MAX_SSID {
                    return Err(ParseError::InvalidSsid(s.to_string()));
                }
                (call, ssid)
            }
            _ => (s, 0),
        };

        let valid = !call.is_empty()
            && call.len() <= MAX_CALL_LEN
            && call.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
        if !valid {
            return Err(ParseError::InvalidAddress(s.to_string()));
        }

        Ok(Self {
            call: call.to_string(),
            ssid,
            digipeated,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.call)?;
        if self.ssid != 0 {
            write!(f, "-{}", self.ssid)?;
        }
        if self.digipeated {
            f.write_str("*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет разбор позывного с SSID и без него.
    #[test]
    fn test_parse_call_and_ssid() {
        let a: Address = "KG6HWF-9".parse().unwrap();
        assert_eq!(a.call(), "KG6HWF");
        assert_eq!(a.ssid(), 9);
        assert!(!a.is_digipeated());

        let b: Address = "APRS".parse().unwrap();
        assert_eq!(b.call(), "APRS");
        assert_eq!(b.ssid(), 0);
    }

    /// Тест проверяет флаг ретрансляции и обратное форматирование.
    #[test]
    fn test_digipeated_marker() {
        let a: Address = "WIDE2-1*".parse().unwrap();
        assert!(a.is_digipeated());
        assert_eq!(a.to_string(), "WIDE2-1*");
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(matches!(
            "".parse::<Address>(),
            Err(ParseError::InvalidAddress(_))
        ));
        assert!(matches!(
            "N0CALL-16".parse::<Address>(),
            Err(ParseError::InvalidSsid(_))
        ));
        assert!(matches!(
            "TOOLONGCALL".parse::<Address>(),
            Err(ParseError::InvalidAddress(_))
        ));
    }

    /// q-конструкции APRS-IS не являются позывными, но должны разбираться.
    #[test]
    fn test_aprs_is_q_construct() {
        let a: Address = "qAR".parse().unwrap();
        assert_eq!(a.to_string(), "qAR");
    }

    #[test]
    fn test_same_call_ignores_ssid_and_case() {
        let a: Address = "kg6hwf-7".parse().unwrap();
        assert!(a.same_call("KG6HWF"));
        assert!(!a.same_call("KG6HW"));
    }
}

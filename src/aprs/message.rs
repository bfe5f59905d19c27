use std::{fmt, str::FromStr};

use super::{Address, Body};
use crate::ParseError;

/// Разобранный APRS-пакет.
///
/// Создаётся адаптером источника и после этого не изменяется: брокер
/// раздаёт подписчикам `Arc<Message>`, поэтому доступ возможен только на
/// чтение.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    source: Address,
    destination: Address,
    path: Vec<Address>,
    body: Body,
}

impl Message {
    pub fn new(
        source: Address,
        destination: Address,
        path: Vec<Address>,
        body: Body,
    ) -> Self {
        Self {
            source,
            destination,
            path,
            body,
        }
    }

    pub fn source(&self) -> &Address {
        &self.source
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// Маршрут через дигипитеры в порядке следования.
    pub fn path(&self) -> &[Address] {
        &self.path
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

/// Разбор строки в формате TNC2: `SRC>DST,PATH1,PATH2:body`.
impl FromStr for Message {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let (header, body) = line.split_once(':').ok_or(ParseError::MissingBody)?;
        let (source, route) = header.split_once('>').ok_or(ParseError::MissingSource)?;

        let mut hops = route.split(',');
        let destination = hops.next().unwrap_or_default().parse()?;
        let path = hops
            .map(str::parse)
            .collect::<Result<Vec<Address>, _>>()?;

        Ok(Self {
            source: source.parse()?,
            destination,
            path,
            body: Body::parse(body),
        })
    }
}

/// Каноническое текстовое представление, которое получают подписчики
/// сервера ретрансляции.
impl fmt::Display for Message {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}>{}", self.source, self.destination)?;
        for hop in &self.path {
            write!(f, ",{hop}")?;
        }
        write!(f, ":{}", self.body)
    }
}

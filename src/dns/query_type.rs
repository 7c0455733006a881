//! DNS record type definitions and conversions

use std::fmt;

use serde_derive::{Deserialize, Serialize};

/// `QueryType` represents the Record Type of a query or an answer
///
/// DoH JSON answers carry the numeric type while the request URL carries the
/// mnemonic: `from_num`/`to_num` handle the numeric code and `Display`
/// renders the mnemonic. Codes without a variant are kept as `Unknown` so
/// they survive a round trip.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy, Serialize, Deserialize)]
pub enum QueryType {
    Unknown(u16),
    A,     // 1
    Ns,    // 2
    Cname, // 5
    Soa,   // 6
    Mx,    // 15
    Txt,   // 16
    Aaaa,  // 28
    Srv,   // 33
    Caa,   // 257
}

impl QueryType {
    pub fn to_num(&self) -> u16 {
        match *self {
            QueryType::Unknown(x) => x,
            QueryType::A => 1,
            QueryType::Ns => 2,
            QueryType::Cname => 5,
            QueryType::Soa => 6,
            QueryType::Mx => 15,
            QueryType::Txt => 16,
            QueryType::Aaaa => 28,
            QueryType::Srv => 33,
            QueryType::Caa => 257,
        }
    }

    pub fn from_num(num: u16) -> QueryType {
        match num {
            1 => QueryType::A,
            2 => QueryType::Ns,
            5 => QueryType::Cname,
            6 => QueryType::Soa,
            15 => QueryType::Mx,
            16 => QueryType::Txt,
            28 => QueryType::Aaaa,
            33 => QueryType::Srv,
            257 => QueryType::Caa,
            _ => QueryType::Unknown(num),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            // RFC 3597 presentation for types without a mnemonic
            QueryType::Unknown(x) => write!(f, "TYPE{}", x),
            QueryType::A => f.write_str("A"),
            QueryType::Ns => f.write_str("NS"),
            QueryType::Cname => f.write_str("CNAME"),
            QueryType::Soa => f.write_str("SOA"),
            QueryType::Mx => f.write_str("MX"),
            QueryType::Txt => f.write_str("TXT"),
            QueryType::Aaaa => f.write_str("AAAA"),
            QueryType::Srv => f.write_str("SRV"),
            QueryType::Caa => f.write_str("CAA"),
        }
    }
}

// src/fits/header.rs
// ============================================================================
// FITS HEADER - Cards de 80 caracteres en bloques de 2880 bytes
// ============================================================================

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::error::{FitsError, FitsResult};

/// Tamaño de bloque FITS
pub const BLOCK_SIZE: usize = 2880;

/// Tamaño de una card
pub const CARD_SIZE: usize = 80;

const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Máximo de caracteres de un string entre comillas (cols 12-79)
const MAX_STRING_LEN: usize = 68;

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9_-]{1,8}$").unwrap());

/// Redondea al siguiente múltiplo de 2880
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Valor de una keyword
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Str(String),
    Logical(bool),
    Int(i64),
    Float(f64),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Entero; acepta floats sin parte fraccionaria (ej. `NEXTEND = 3.0`)
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            HeaderValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Int(i) => Some(*i as f64),
            HeaderValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Texto del campo de valor en formato fijo
    fn to_field(&self) -> String {
        match self {
            HeaderValue::Str(s) => {
                let quoted = s.replace('\'', "''");
                format!("'{:<8}'", quoted)
            }
            HeaderValue::Logical(b) => format!("{:>20}", if *b { "T" } else { "F" }),
            HeaderValue::Int(i) => format!("{:>20}", i),
            HeaderValue::Float(f) => format!("{:>20}", format_float(*f)),
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Str(s) => write!(f, "{}", s),
            HeaderValue::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            HeaderValue::Int(i) => write!(f, "{}", i),
            HeaderValue::Float(v) => write!(f, "{}", format_float(*v)),
        }
    }
}

/// Float con punto decimal siempre visible; exponente fuera de rango razonable
pub fn format_float(v: f64) -> String {
    if !v.is_finite() {
        return format!("{}", v);
    }
    let abs = v.abs();
    if v == 0.0 || (1e-4..1e15).contains(&abs) {
        let s = format!("{}", v);
        if s.contains('.') {
            s
        } else {
            format!("{}.0", s)
        }
    } else {
        format!("{:E}", v)
    }
}

/// Una card de header (80 caracteres)
#[derive(Debug, Clone)]
pub struct Card {
    pub keyword: String,
    pub value: Option<HeaderValue>,
    pub comment: Option<String>,
    image: String,
}

impl Card {
    /// Construye una card en formato fijo
    pub fn new(keyword: &str, value: HeaderValue, comment: Option<&str>) -> FitsResult<Self> {
        let keyword = keyword.trim().to_uppercase();
        if !KEYWORD_RE.is_match(&keyword) {
            return Err(FitsError::InvalidKeywordName(keyword));
        }

        if let HeaderValue::Str(s) = &value {
            if s.replace('\'', "''").len() > MAX_STRING_LEN {
                return Err(FitsError::InvalidKeyword {
                    hdu: 0,
                    key: keyword,
                    value: s.clone(),
                });
            }
        }

        let mut image = format!("{:<8}= {}", keyword, value.to_field());
        if let Some(c) = comment {
            image.push_str(" / ");
            image.push_str(c);
        }
        image.truncate(CARD_SIZE);
        let image = format!("{:<80}", image);

        Ok(Self {
            keyword,
            value: Some(value),
            comment: comment.map(str::to_string),
            image,
        })
    }

    /// Parsea los 80 bytes de una card
    pub fn parse(raw: &[u8]) -> Self {
        // ASCII estricto: cualquier byte fuera de rango se reemplaza
        let image: String = raw
            .iter()
            .take(CARD_SIZE)
            .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '?' })
            .collect();
        let image = format!("{:<80}", image);

        let keyword = image[..8].trim_end().to_string();

        let (value, comment) = if &image[8..10] == "= " && !is_commentary(&keyword) {
            parse_value_field(&image[10..])
        } else {
            (None, None)
        };

        Self { keyword, value, comment, image }
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn is_commentary(&self) -> bool {
        is_commentary(&self.keyword)
    }

    fn is_end(&self) -> bool {
        self.keyword == "END"
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.image.trim_end())
    }
}

fn is_commentary(keyword: &str) -> bool {
    matches!(keyword, "" | "COMMENT" | "HISTORY")
}

/// Parsea el campo de valor (columnas 11-80)
fn parse_value_field(field: &str) -> (Option<HeaderValue>, Option<String>) {
    let field = field.trim_start();

    if let Some(rest) = field.strip_prefix('\'') {
        // String: '' es una comilla escapada
        let mut value = String::new();
        let mut chars = rest.char_indices().peekable();
        let mut end = rest.len();
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    value.push('\'');
                    chars.next();
                } else {
                    end = i + 1;
                    break;
                }
            } else {
                value.push(c);
            }
        }
        let comment = rest[end.min(rest.len())..]
            .split_once('/')
            .map(|(_, c)| c.trim().to_string());
        return (Some(HeaderValue::Str(value.trim_end().to_string())), comment);
    }

    let (raw, comment) = match field.split_once('/') {
        Some((v, c)) => (v.trim(), Some(c.trim().to_string())),
        None => (field.trim(), None),
    };

    let value = match raw {
        "" => None,
        "T" => Some(HeaderValue::Logical(true)),
        "F" => Some(HeaderValue::Logical(false)),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                Some(HeaderValue::Int(i))
            } else if let Ok(f) = raw.replace(['D', 'd'], "E").parse::<f64>() {
                Some(HeaderValue::Float(f))
            } else {
                // Complejos u otros formatos: se conservan como texto
                Some(HeaderValue::Str(raw.to_string()))
            }
        }
    };

    (value, comment)
}

/// Header de un HDU (sin la card END)
#[derive(Debug, Clone, Default)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsea un header desde el inicio de `data`.
    /// Devuelve el header y los bytes consumidos (incluyendo padding).
    pub fn parse(data: &[u8], hdu: usize) -> FitsResult<(Self, usize)> {
        let mut cards = Vec::new();

        for (i, raw) in data.chunks(CARD_SIZE).enumerate() {
            if raw.len() < CARD_SIZE {
                break;
            }
            let card = Card::parse(raw);
            if card.is_end() {
                let used = (i + 1).div_ceil(CARDS_PER_BLOCK) * BLOCK_SIZE;
                if used > data.len() {
                    return Err(FitsError::Truncated {
                        offset: 0,
                        needed: used,
                        len: data.len(),
                    });
                }
                return Ok((Self { cards }, used));
            }
            cards.push(card);
        }

        Err(FitsError::MissingEnd { hdu })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Primera card con esa keyword (case-insensitive)
    pub fn card(&self, key: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.keyword.eq_ignore_ascii_case(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.card(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.card(key).and_then(|c| c.value.as_ref())
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_int)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }

    /// Keyword entera obligatoria
    pub fn require_int(&self, key: &str, hdu: usize) -> FitsResult<i64> {
        match self.get(key) {
            None => Err(FitsError::MissingKeyword { hdu, key: key.to_string() }),
            Some(v) => v.as_int().ok_or_else(|| FitsError::InvalidKeyword {
                hdu,
                key: key.to_string(),
                value: v.to_string(),
            }),
        }
    }

    /// Keyword obligatoria de tamaño o contador: entera y no negativa
    pub fn require_len(&self, key: &str, hdu: usize) -> FitsResult<usize> {
        let value = self.require_int(key, hdu)?;
        usize::try_from(value).map_err(|_| FitsError::InvalidKeyword {
            hdu,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Como [`Header::require_len`], con `default` si la keyword falta
    pub fn len_or(&self, key: &str, hdu: usize, default: usize) -> FitsResult<usize> {
        if self.get(key).is_none() {
            return Ok(default);
        }
        self.require_len(key, hdu)
    }

    /// Keywords con valor, en orden y sin repetidos
    pub fn keywords(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for card in &self.cards {
            if card.is_commentary() || card.value.is_none() {
                continue;
            }
            if !seen.contains(&card.keyword.as_str()) {
                seen.push(&card.keyword);
            }
        }
        seen
    }

    /// Modifica una keyword existente o la añade al final
    pub fn set(&mut self, key: &str, value: HeaderValue) -> FitsResult<()> {
        let position = self
            .cards
            .iter()
            .position(|c| c.keyword.eq_ignore_ascii_case(key.trim()));

        match position {
            Some(i) => {
                let comment = self.cards[i].comment.clone();
                self.cards[i] = Card::new(key, value, comment.as_deref())?;
            }
            None => {
                let card = Card::new(key, value, None)?;
                // Antes de las cards en blanco finales, si las hay
                let insert_at = self
                    .cards
                    .iter()
                    .rposition(|c| !c.keyword.is_empty())
                    .map_or(self.cards.len(), |i| i + 1);
                self.cards.insert(insert_at, card);
            }
        }
        Ok(())
    }

    /// Tamaño en disco (con END y padding)
    pub fn byte_len(&self) -> usize {
        padded_len((self.cards.len() + 1) * CARD_SIZE)
    }

    /// Serializa cards + END, rellenando con espacios hasta 2880
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.byte_len());
        for card in &self.cards {
            buf.extend_from_slice(card.image.as_bytes());
        }
        buf.extend_from_slice(format!("{:<80}", "END").as_bytes());
        buf.resize(self.byte_len(), b' ');
        buf
    }
}

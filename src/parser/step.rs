use std::collections::HashMap;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u64),
    List(Vec<StepValue>),
    Null,
    Derived,
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    /// Non-empty string attribute at `index`.
    #[must_use]
    pub fn string_at(&self, index: usize) -> Option<String> {
        match self.values.get(index) {
            Some(StepValue::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn reference_at(&self, index: usize) -> Option<u64> {
        match self.values.get(index) {
            Some(StepValue::Reference(id)) => Some(*id),
            _ => None,
        }
    }

    /// References held in a list attribute; other list items are ignored.
    #[must_use]
    pub fn references_at(&self, index: usize) -> Vec<u64> {
        match self.values.get(index) {
            Some(StepValue::List(list)) => list
                .iter()
                .filter_map(|item| match item {
                    StepValue::Reference(id) => Some(*id),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct StepFile {
    pub entities: HashMap<u64, StepEntity>,
    pub schema: String,
}

impl StepFile {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut entities = HashMap::new();
        let mut schema = String::new();
        let mut in_data = false;
        let mut saw_data = false;

        for statement in split_statements(content) {
            let statement = statement.trim();

            // Parse schema
            if statement.starts_with("FILE_SCHEMA") {
                if let Some(start) = statement.find("('") {
                    if let Some(end) = statement[start + 2..].find('\'') {
                        schema = statement[start + 2..start + 2 + end].to_string();
                    }
                }
                continue;
            }

            if statement == "DATA" {
                in_data = true;
                saw_data = true;
                continue;
            }
            if statement == "ENDSEC" {
                in_data = false;
                continue;
            }

            if in_data && statement.starts_with('#') {
                if let Some(entity) = Self::parse_entity(statement) {
                    entities.insert(entity.id, entity);
                }
            }
        }

        if !saw_data {
            return Err(ParseError::InvalidStep {
                message: "missing DATA section".to_string(),
            });
        }

        Ok(StepFile { entities, schema })
    }

    fn parse_entity(statement: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...)
        let eq_pos = statement.find('=')?;
        let id: u64 = statement[1..eq_pos].trim().parse().ok()?;

        let rest = statement[eq_pos + 1..].trim();
        let paren_pos = rest.find('(')?;
        let close_pos = rest.rfind(')')?;
        if close_pos <= paren_pos {
            return None;
        }
        let entity_type = rest[..paren_pos].trim().to_string();

        let values = Self::parse_values(&rest[paren_pos + 1..close_pos]);

        Some(StepEntity {
            id,
            entity_type,
            values,
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0;

        for ch in s.chars() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth -= 1;
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(current.trim()));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(current.trim()));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        if s == "$" {
            return StepValue::Null;
        }
        if s == "*" {
            return StepValue::Derived;
        }
        if let Some(stripped) = s.strip_prefix('#') {
            if let Ok(id) = stripped.parse::<u64>() {
                return StepValue::Reference(id);
            }
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            let raw = &s[1..s.len() - 1];
            return StepValue::String(decode_step_string(raw));
        }
        if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
            let inner = &s[1..s.len() - 1];
            if inner == "T" {
                return StepValue::Boolean(true);
            }
            if inner == "F" {
                return StepValue::Boolean(false);
            }
            return StepValue::Enum(inner.to_string());
        }
        if s.starts_with('(') && s.ends_with(')') {
            let inner = &s[1..s.len() - 1];
            return StepValue::List(Self::parse_values(inner));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        // Typed value like IFCBOOLEAN(.T.)
        if let Some(paren_pos) = s.find('(') {
            if s.ends_with(')') {
                let inner = &s[paren_pos + 1..s.len() - 1];
                return Self::parse_single_value(inner);
            }
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one STEP type in ascending id order.
    #[must_use]
    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }
}

/// Splits exchange-file content into `;`-terminated statements, honouring
/// quoted strings and dropping `/* */` comments. Statements may span lines.
fn split_statements(content: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_string {
            if ch == '\'' {
                in_string = false;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '\'' => {
                in_string = true;
                current.push(ch);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' => {
                statements.push(std::mem::take(&mut current));
            }
            '\r' | '\n' => {}
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current);
    }
    statements
}

/// Decode STEP/IFC encoded strings with Unicode escape sequences.
/// Supports:
/// - `\X2\XXXX\X0\` - 2-byte Unicode (BMP), can have multiple 4-char hex codes
/// - `\X\XX` - 1-byte ISO 8859-1
/// - `\S\X` - ISO 8859-1 high half
/// - `\\` - escaped backslash
/// - `''` - escaped apostrophe
fn decode_step_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('X') => {
                    chars.next(); // consume 'X'
                    match chars.peek() {
                        Some('2') => {
                            chars.next(); // consume '2'
                            chars.next(); // consume '\'

                            let mut hex = String::new();
                            while let Some(&c) = chars.peek() {
                                if c == '\\' {
                                    break;
                                }
                                hex.push(c);
                                chars.next();
                            }
                            // Skip \X0\
                            if chars.peek() == Some(&'\\') {
                                for _ in 0..4 {
                                    chars.next();
                                }
                            }
                            for chunk in hex.as_bytes().chunks(4) {
                                if let Some(c) = std::str::from_utf8(chunk)
                                    .ok()
                                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                                    .and_then(char::from_u32)
                                {
                                    result.push(c);
                                }
                            }
                        }
                        Some('\\') => {
                            chars.next(); // consume '\'
                            let hex: String = chars.by_ref().take(2).collect();
                            if let Ok(code) = u8::from_str_radix(&hex, 16) {
                                result.push(char::from(code));
                            }
                        }
                        _ => {
                            result.push('\\');
                            result.push('X');
                        }
                    }
                }
                Some('\\') => {
                    chars.next();
                    result.push('\\');
                }
                Some('S') => {
                    chars.next(); // 'S'
                    chars.next(); // '\'
                    if let Some(c) = chars.next() {
                        if c.is_ascii() {
                            result.push(char::from(c as u8 + 128));
                        }
                    }
                }
                _ => result.push('\\'),
            }
        } else if ch == '\'' {
            // '' is escaped apostrophe in STEP
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            result.push('\'');
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
/* storey */
#1=IFCBUILDINGSTOREY('0abc',$,'Level; 1',$,$,$,$,$,.ELEMENT.,3000.);
#2=IFCRELAGGREGATES('0rel',$,$,$,#1,
  (#3,#4));
#5=IFCPROPERTYSINGLEVALUE('Area',$,IFCAREAMEASURE(20.5),$);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn parses_multiline_statements_and_schema() {
        let file = StepFile::parse(SAMPLE).unwrap();
        assert_eq!(file.schema, "IFC4");
        assert_eq!(file.entities.len(), 3);

        let storey = file.get_entity(1).unwrap();
        assert_eq!(storey.entity_type, "IFCBUILDINGSTOREY");
        assert_eq!(storey.string_at(2).as_deref(), Some("Level; 1"));
        assert_eq!(storey.values[8], StepValue::Enum("ELEMENT".into()));
        assert_eq!(storey.values[9], StepValue::Real(3000.0));

        let rel = file.get_entity(2).unwrap();
        assert_eq!(rel.reference_at(4), Some(1));
        assert_eq!(rel.references_at(5), vec![3, 4]);

        let prop = file.get_entity(5).unwrap();
        assert_eq!(prop.values[2], StepValue::Real(20.5));
    }

    #[test]
    fn missing_data_section_is_invalid() {
        let err = StepFile::parse("ISO-10303-21;\nHEADER;\nENDSEC;\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStep { .. }));
    }

    #[test]
    fn entities_by_type_are_sorted() {
        let content = "DATA;\n#9=IFCWALL('b');\n#3=IFCWALL('a');\n#4=IFCDOOR('c');\nENDSEC;";
        let file = StepFile::parse(content).unwrap();
        let ids: Vec<_> = file
            .get_entities_by_type("IFCWALL")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![3, 9]);
    }

    #[test]
    fn decodes_escapes() {
        assert_eq!(decode_step_string("Pok\\X2\\00F3\\X0\\j"), "Pokój");
        assert_eq!(decode_step_string("Caf\\X\\E9"), "Café");
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
    }

    #[test]
    fn null_and_empty_strings_are_not_names() {
        let content = "DATA;\n#1=IFCSPACE('g',$,'',$);\nENDSEC;";
        let file = StepFile::parse(content).unwrap();
        let space = file.get_entity(1).unwrap();
        assert_eq!(space.string_at(2), None);
        assert_eq!(space.string_at(3), None);
        assert_eq!(space.string_at(0).as_deref(), Some("g"));
    }
}

//! Compound FQN syntax.
//!
//! Extraction encodes structure into names instead of emitting separate rows
//! for every use of a compound type. This module recognizes those shapes:
//!
//! | Shape | Form |
//! |-------|------|
//! | method | contains `(`; receiver is everything before the last `.` ahead of the `(` |
//! | array | ends with `[]`, e.g. `int[][]`, `java.util.List<java.lang.String>[]` |
//! | wildcard | `<?>`, `<?+Bound>`, `<?-Bound>`, or source form `?`, `? extends B`, `? super B` |
//! | type variable | `<T>`, `<T+Bound1&Bound2>` |
//! | parameterized | `java.util.Map<K,V>`, `Outer<A>.Inner<B>` |
//!
//! Only `<`/`>` nesting matters when splitting; separators inside type
//! arguments are never treated as top-level.

/// Member name prefix of constructors.
pub const CONSTRUCTOR: &str = "<init>";
/// Member name prefix of static initializers.
pub const INITIALIZER: &str = "<clinit>";

/// Bound of a wildcard type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardBound<'a> {
    Unbounded,
    /// `? extends B` / `<?+B>`
    Upper(&'a str),
    /// `? super B` / `<?-B>`
    Lower(&'a str),
}

/// Structural reading of a type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName<'a> {
    Array { element: &'a str, dimensions: u32 },
    Wildcard(WildcardBound<'a>),
    TypeVariable { name: &'a str, bounds: Vec<&'a str> },
    Parameterized { base: String, arguments: Vec<&'a str> },
    /// Anything without compound structure (including malformed names).
    Simple,
}

impl<'a> TypeName<'a> {
    /// Classify a name. Checks run in the order arrays, wildcards, type
    /// variables, parameterized types.
    pub fn parse(fqn: &'a str) -> Self {
        if let Some(array) = parse_array(fqn) {
            return array;
        }
        if let Some(bound) = parse_wildcard(fqn) {
            return TypeName::Wildcard(bound);
        }
        if let Some(variable) = parse_type_variable(fqn) {
            return variable;
        }
        if let Some(parameterized) = parse_parameterized(fqn) {
            return parameterized;
        }
        TypeName::Simple
    }

    pub fn is_compound(&self) -> bool {
        !matches!(self, TypeName::Simple)
    }
}

/// True if the name refers to a method, constructor or initializer.
pub fn is_method(fqn: &str) -> bool {
    fqn.contains('(')
}

/// True if the name is a compound type (array, wildcard, type variable or
/// parameterized type) rather than a member reference. A parameterized
/// receiver followed by a member, such as `a.Box<T>.f`, is a member.
pub fn is_compound_type(fqn: &str) -> bool {
    if is_method(fqn) {
        return false;
    }
    match TypeName::parse(fqn) {
        TypeName::Simple => false,
        TypeName::Parameterized { .. } => fqn.ends_with('>'),
        _ => true,
    }
}

/// True if the name is an array type.
pub fn is_array(fqn: &str) -> bool {
    fqn.ends_with("[]")
}

/// A `Receiver.member` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub receiver: &'a str,
    /// Member name, including the signature suffix for methods.
    pub member: &'a str,
}

impl<'a> MemberRef<'a> {
    /// Split a reference into receiver and member. Returns `None` when the
    /// name has no top-level `.` to split at.
    pub fn parse(fqn: &'a str) -> Option<Self> {
        let head = match fqn.find('(') {
            Some(paren) => &fqn[..paren],
            None => fqn,
        };
        let dot = rfind_top_level(head, '.')?;
        Some(MemberRef {
            receiver: &fqn[..dot],
            member: &fqn[dot + 1..],
        })
    }

    pub fn is_method(&self) -> bool {
        is_method(self.member)
    }

    /// Constructors and static initializers never dispatch virtually.
    pub fn is_constructor_or_initializer(&self) -> bool {
        self.member.starts_with(CONSTRUCTOR) || self.member.starts_with(INITIALIZER)
    }
}

// ============================================================================
// Shape parsers
// ============================================================================

fn parse_array(fqn: &str) -> Option<TypeName<'_>> {
    if !is_array(fqn) {
        return None;
    }
    let start = find_top_level(fqn, "[]")?;
    let suffix = &fqn[start..];
    if suffix.len() % 2 != 0 || !suffix.as_bytes().chunks(2).all(|pair| pair == b"[]") {
        return None;
    }
    let element = &fqn[..start];
    if element.is_empty() {
        return None;
    }
    Some(TypeName::Array {
        element,
        dimensions: (suffix.len() / 2) as u32,
    })
}

fn parse_wildcard(fqn: &str) -> Option<WildcardBound<'_>> {
    if let Some(inner) = fqn.strip_prefix("<?").and_then(|s| s.strip_suffix('>')) {
        return match inner.as_bytes().first().copied() {
            None => Some(WildcardBound::Unbounded),
            Some(b'+') => non_empty(&inner[1..]).map(WildcardBound::Upper),
            Some(b'-') => non_empty(&inner[1..]).map(WildcardBound::Lower),
            Some(_) => None,
        };
    }
    let rest = fqn.strip_prefix('?')?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Some(WildcardBound::Unbounded);
    }
    if let Some(bound) = rest.strip_prefix("extends ") {
        return non_empty(bound.trim()).map(WildcardBound::Upper);
    }
    if let Some(bound) = rest.strip_prefix("super ") {
        return non_empty(bound.trim()).map(WildcardBound::Lower);
    }
    None
}

fn parse_type_variable(fqn: &str) -> Option<TypeName<'_>> {
    let inner = fqn.strip_prefix('<')?.strip_suffix('>')?;
    if !is_balanced(inner) {
        return None;
    }
    let (name, bounds) = match find_top_level(inner, "+") {
        Some(plus) => (&inner[..plus], split_top_level(&inner[plus + 1..], '&')),
        None => (inner, Vec::new()),
    };
    let name = non_empty(name.trim())?;
    Some(TypeName::TypeVariable { name, bounds })
}

fn parse_parameterized(fqn: &str) -> Option<TypeName<'_>> {
    if fqn.starts_with('<') || !fqn.contains('<') || !is_balanced(fqn) {
        return None;
    }
    let mut base = String::with_capacity(fqn.len());
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut group_start = 0usize;
    for (i, c) in fqn.char_indices() {
        match c {
            '<' => {
                if depth == 0 {
                    group_start = i + 1;
                }
                depth += 1;
            }
            '>' => {
                depth -= 1;
                if depth == 0 {
                    arguments.extend(split_top_level(&fqn[group_start..i], ','));
                }
            }
            _ if depth == 0 => base.push(c),
            _ => {}
        }
    }
    if base.is_empty() || arguments.is_empty() {
        return None;
    }
    Some(TypeName::Parameterized { base, arguments })
}

// ============================================================================
// Depth-aware string helpers
// ============================================================================

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn is_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Byte index of the first occurrence of `pat` outside any `<...>`.
fn find_top_level(s: &str, pat: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 && s[i..].starts_with(pat) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Byte index of the last `needle` outside any `<...>`.
fn rfind_top_level(s: &str, needle: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut found = None;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && c == needle => found = Some(i),
            _ => {}
        }
    }
    found
}

/// Split on `sep` outside any `<...>`, trimming each piece and dropping
/// empty ones.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && c == sep => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    mod type_name_tests {
        use super::*;

        #[test]
        fn simple_names() {
            assert_eq!(TypeName::parse("java.lang.String"), TypeName::Simple);
            assert_eq!(TypeName::parse("int"), TypeName::Simple);
            assert!(!TypeName::parse("a.B").is_compound());
        }

        #[test]
        fn arrays_count_dimensions() {
            assert_eq!(
                TypeName::parse("int[][]"),
                TypeName::Array {
                    element: "int",
                    dimensions: 2
                }
            );
            assert_eq!(
                TypeName::parse("java.util.List<java.lang.String[]>[]"),
                TypeName::Array {
                    element: "java.util.List<java.lang.String[]>",
                    dimensions: 1
                }
            );
        }

        #[test]
        fn bare_brackets_are_not_an_array() {
            assert_eq!(TypeName::parse("[]"), TypeName::Simple);
        }

        #[test]
        fn wildcards_in_both_encodings() {
            assert_eq!(
                TypeName::parse("<?>"),
                TypeName::Wildcard(WildcardBound::Unbounded)
            );
            assert_eq!(
                TypeName::parse("<?+java.lang.Number>"),
                TypeName::Wildcard(WildcardBound::Upper("java.lang.Number"))
            );
            assert_eq!(
                TypeName::parse("<?-java.lang.Integer>"),
                TypeName::Wildcard(WildcardBound::Lower("java.lang.Integer"))
            );
            assert_eq!(
                TypeName::parse("?"),
                TypeName::Wildcard(WildcardBound::Unbounded)
            );
            assert_eq!(
                TypeName::parse("? extends java.lang.Number"),
                TypeName::Wildcard(WildcardBound::Upper("java.lang.Number"))
            );
            assert_eq!(
                TypeName::parse("? super java.lang.Integer"),
                TypeName::Wildcard(WildcardBound::Lower("java.lang.Integer"))
            );
        }

        #[test]
        fn type_variables_split_bounds() {
            assert_eq!(
                TypeName::parse("<T>"),
                TypeName::TypeVariable {
                    name: "T",
                    bounds: vec![]
                }
            );
            assert_eq!(
                TypeName::parse("<T+java.lang.Number&java.lang.Comparable<<T+java.lang.Number>>>"),
                TypeName::TypeVariable {
                    name: "T",
                    bounds: vec![
                        "java.lang.Number",
                        "java.lang.Comparable<<T+java.lang.Number>>"
                    ]
                }
            );
        }

        #[test]
        fn parameterized_types_split_arguments() {
            assert_eq!(
                TypeName::parse("java.util.Map<java.lang.String,java.util.List<java.lang.Integer>>"),
                TypeName::Parameterized {
                    base: "java.util.Map".to_string(),
                    arguments: vec!["java.lang.String", "java.util.List<java.lang.Integer>"]
                }
            );
        }

        #[test]
        fn nested_owner_arguments_are_collected_in_order() {
            assert_eq!(
                TypeName::parse("a.Outer<x.A>.Inner<x.B>"),
                TypeName::Parameterized {
                    base: "a.Outer.Inner".to_string(),
                    arguments: vec!["x.A", "x.B"]
                }
            );
        }

        #[test]
        fn unbalanced_names_are_simple() {
            assert_eq!(TypeName::parse("a.B<c.D"), TypeName::Simple);
            assert_eq!(TypeName::parse("a.B>"), TypeName::Simple);
        }
    }

    mod member_tests {
        use super::*;

        #[test]
        fn method_receiver_ignores_dots_in_signature() {
            let member = MemberRef::parse("a.B.m(java.lang.String,int)").unwrap();
            assert_eq!(member.receiver, "a.B");
            assert_eq!(member.member, "m(java.lang.String,int)");
            assert!(member.is_method());
        }

        #[test]
        fn receiver_may_be_parameterized() {
            let member = MemberRef::parse("java.util.List<java.lang.String>.get(int)").unwrap();
            assert_eq!(member.receiver, "java.util.List<java.lang.String>");
            assert_eq!(member.member, "get(int)");
        }

        #[test]
        fn field_reference() {
            let member = MemberRef::parse("a.B.count").unwrap();
            assert_eq!(member.receiver, "a.B");
            assert_eq!(member.member, "count");
            assert!(!member.is_method());
        }

        #[test]
        fn constructors_and_initializers() {
            assert!(MemberRef::parse("a.B.<init>()")
                .unwrap()
                .is_constructor_or_initializer());
            assert!(MemberRef::parse("a.B.<clinit>()")
                .unwrap()
                .is_constructor_or_initializer());
            assert!(!MemberRef::parse("a.B.init()")
                .unwrap()
                .is_constructor_or_initializer());
        }

        #[test]
        fn array_receiver() {
            let member = MemberRef::parse("a.T[].hashCode()").unwrap();
            assert_eq!(member.receiver, "a.T[]");
            assert!(is_array(member.receiver));
        }

        #[test]
        fn no_dot_means_no_member() {
            assert_eq!(MemberRef::parse("m()"), None);
            assert_eq!(MemberRef::parse("field"), None);
        }

        #[test]
        fn compound_types_are_not_members() {
            assert!(is_compound_type("p.A[]"));
            assert!(is_compound_type("java.util.List<? extends java.lang.Number>[]"));
            assert!(is_compound_type("java.util.Map<K,V>"));
            assert!(is_compound_type("? super java.lang.Integer"));
            assert!(is_compound_type("<T+java.lang.Comparable<T>>"));

            assert!(!is_compound_type("p.A"));
            assert!(!is_compound_type("p.A.f"));
            assert!(!is_compound_type("p.A[].length"));
            assert!(!is_compound_type("a.Box<T>.f"));
            assert!(!is_compound_type("java.util.List<E>.get(int)"));
        }
    }
}

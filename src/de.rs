//! The schema-driven parser.
//!
//! A recursive-descent engine over the lexer's token stream. The declared
//! root class drives validation: every value position is parsed against its
//! declared [`LocalType`], falling back to schema-less materialization
//! (untyped objects, unresolved enum references, plain collections) wherever
//! no declared type exists — unknown properties never fail a parse.
//!
//! Failure handling follows two tracks:
//!
//! - *Structural* problems (an unexpected token, a reference that leaves the
//!   grammar un-typable) record a diagnostic and unwind through the typed
//!   `Abort` signal, which the entry point converts into `None`.
//! - *Value-local* problems (invalid atom literal, null where disallowed,
//!   duplicate set items or map keys, missing or duplicated properties)
//!   record a diagnostic and keep scanning.
//!
//! The overall result is `Some` iff no `Error`-severity diagnostic was
//! recorded.
//!
//! A `Parser` may be reused for sequential parses — each call fully resets
//! the alias-scope stack — but is not meant to be shared across threads; use
//! one instance per thread.

use crate::atom;
use crate::diag::{DiagCode, Diagnostics};
use crate::lexer::{Token, TokenKind};
use crate::meta::{
    AtomKind, ClassType, CoreType, EnumType, FullName, GlobalRef, GlobalType, LocalType, Registry,
};
use crate::span::TextSpan;
use crate::value::{EnumValue, Object, UntypedEnumValue, Value};
use indexmap::IndexMap;
use std::collections::HashSet;

/// The typed abort signal: a structural error already recorded as a
/// diagnostic, unwinding to the entry point.
struct Abort;

type PResult<T> = Result<T, Abort>;

/// The recursive-descent parser. See the module docs for the contract.
pub struct Parser<'a> {
    registry: &'a Registry,
    tokens: Vec<Token>,
    pos: usize,
    alias_scopes: Vec<IndexMap<String, String>>,
}

impl<'a> Parser<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Parser {
            registry,
            tokens: Vec::new(),
            pos: 0,
            alias_scopes: Vec::new(),
        }
    }

    /// Parses one unit — an optional alias header, exactly one class value
    /// of (or derived from) `root`, then end of input.
    ///
    /// Diagnostics accumulate into `diags`; the result is `Some` iff no
    /// error was recorded.
    pub fn parse(
        &mut self,
        tokens: Vec<Token>,
        root: &FullName,
        diags: &mut Diagnostics,
    ) -> Option<Object> {
        self.tokens = tokens;
        if self.tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            self.tokens.push(Token {
                kind: TokenKind::Eof,
                span: TextSpan::invalid(),
            });
        }
        self.pos = 0;
        self.alias_scopes.clear();

        let outcome = self.parse_unit(root, diags);
        match outcome {
            Ok(object) if !diags.has_errors() => Some(object),
            _ => None,
        }
    }

    fn parse_unit(&mut self, root: &FullName, diags: &mut Diagnostics) -> PResult<Object> {
        let pushed = self.try_parse_alias_header(diags)?;
        let object = self.parse_class_value(Some(root), diags)?;
        if self.peek().kind != TokenKind::Eof {
            let token = self.peek();
            diags.error(
                DiagCode::EndOfFileExpected,
                format!("expected end of input, found {}", token.kind.describe()),
                token.span.clone(),
            );
            return Err(Abort);
        }
        if pushed {
            self.alias_scopes.pop();
        }
        Ok(object)
    }

    // ----- token plumbing -------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&mut self, expected: &str, diags: &mut Diagnostics) -> Abort {
        let token = self.peek();
        diags.error(
            DiagCode::UnexpectedToken,
            format!("expected {}, found {}", expected, token.kind.describe()),
            token.span.clone(),
        );
        Abort
    }

    fn expect(&mut self, kind: TokenKind, diags: &mut Diagnostics) -> PResult<TextSpan> {
        if self.peek().kind == kind {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(&kind.describe(), diags))
        }
    }

    fn expect_name(&mut self, diags: &mut Diagnostics) -> PResult<(String, TextSpan)> {
        match &self.peek().kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                Ok((name, self.advance().span))
            }
            _ => Err(self.unexpected("a name", diags)),
        }
    }

    fn expect_string(&mut self, diags: &mut Diagnostics) -> PResult<(String, TextSpan)> {
        match &self.peek().kind {
            TokenKind::Str(text) => {
                let text = text.clone();
                Ok((text, self.advance().span))
            }
            _ => Err(self.unexpected("a string literal", diags)),
        }
    }

    // ----- alias scopes ---------------------------------------------------

    /// Parses `< alias = "uri", ... >` if present, pushing a scope.
    /// Returns whether a scope was pushed.
    fn try_parse_alias_header(&mut self, diags: &mut Diagnostics) -> PResult<bool> {
        if self.peek().kind != TokenKind::LAngle {
            return Ok(false);
        }
        self.advance();
        let mut scope = IndexMap::new();
        if self.peek().kind == TokenKind::RAngle {
            self.advance();
            self.alias_scopes.push(scope);
            return Ok(true);
        }
        loop {
            let (alias, alias_span) = self.expect_name(diags)?;
            self.expect(TokenKind::Equals, diags)?;
            let (uri, uri_span) = self.expect_string(diags)?;
            if scope.contains_key(&alias) {
                // First declaration wins.
                diags.error(
                    DiagCode::DuplicateAlias,
                    format!("alias \"{}\" is declared more than once", alias),
                    alias_span,
                );
            } else {
                if !self.registry.has_namespace(&uri) {
                    diags.warning(
                        DiagCode::InvalidUriReference,
                        format!("namespace \"{}\" has no registered types", uri),
                        uri_span,
                    );
                }
                scope.insert(alias, uri);
            }
            match self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RAngle => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("',' or '>'", diags)),
            }
        }
        self.alias_scopes.push(scope);
        Ok(true)
    }

    /// Innermost-first alias lookup; the most recently pushed scope wins.
    fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.alias_scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(alias))
            .map(String::as_str)
    }

    // ----- type references ------------------------------------------------

    /// Parses `( alias :: Name )`, resolving the alias to a full name.
    fn parse_type_indicator(&mut self, diags: &mut Diagnostics) -> PResult<(FullName, TextSpan)> {
        self.expect(TokenKind::LParen, diags)?;
        let (alias, alias_span) = self.expect_name(diags)?;
        self.expect(TokenKind::ColonColon, diags)?;
        let (name, name_span) = self.expect_name(diags)?;
        self.expect(TokenKind::RParen, diags)?;
        match self.resolve_alias(&alias) {
            Some(uri) => Ok((FullName::new(uri, name), name_span)),
            None => {
                diags.error(
                    DiagCode::InvalidAliasReference,
                    format!("alias \"{}\" is not declared in any enclosing scope", alias),
                    alias_span,
                );
                Err(Abort)
            }
        }
    }

    /// Looks up a class by full name, recording a reference diagnostic on
    /// failure. Shared by the typed path (which keeps the diagnostics and
    /// aborts) and the schema-less path (which rolls them back).
    fn resolve_class(
        &self,
        name: &FullName,
        span: &TextSpan,
        diags: &mut Diagnostics,
    ) -> Option<&'a ClassType> {
        let registry = self.registry;
        match registry.class_type(name) {
            Some(class) => Some(class),
            None if !registry.has_namespace(&name.uri) => {
                diags.error(
                    DiagCode::InvalidUriReference,
                    format!("namespace \"{}\" has no registered types", name.uri),
                    span.clone(),
                );
                None
            }
            None => {
                diags.error(
                    DiagCode::InvalidGlobalTypeReference,
                    format!("{} is not a registered class", name),
                    span.clone(),
                );
                None
            }
        }
    }

    // ----- class values ---------------------------------------------------

    fn parse_class_value(
        &mut self,
        declared: Option<&FullName>,
        diags: &mut Diagnostics,
    ) -> PResult<Object> {
        let pushed = self.try_parse_alias_header(diags)?;
        let start_span = self.peek().span.clone();

        let indicated = if self.peek().kind == TokenKind::LParen {
            Some(self.parse_type_indicator(diags)?)
        } else {
            None
        };

        let effective: Option<&'a ClassType> = match declared {
            Some(declared_name) => {
                let registry = self.registry;
                let declared_class = match registry.class_type(declared_name) {
                    Some(class) => class,
                    None => {
                        diags.error(
                            DiagCode::InvalidGlobalTypeReference,
                            format!("declared class {} is not registered", declared_name),
                            start_span.clone(),
                        );
                        return Err(Abort);
                    }
                };
                match &indicated {
                    Some((name, span)) => {
                        let class = match self.resolve_class(name, span, diags) {
                            Some(class) => class,
                            None => return Err(Abort),
                        };
                        if !registry.derives_from(name, declared_name) {
                            diags.error(
                                DiagCode::ClassNotEqualToOrDeriveFromTheDeclared,
                                format!(
                                    "class {} is not equal to or derived from the declared class {}",
                                    name, declared_name
                                ),
                                span.clone(),
                            );
                            return Err(Abort);
                        }
                        Some(class)
                    }
                    None => Some(declared_class),
                }
            }
            None => {
                // Schema-less position: try the indicator reference
                // speculatively; an unknown type is tolerated, so a losing
                // resolution must not leave diagnostics behind.
                if let Some((name, span)) = &indicated {
                    let mark = diags.mark();
                    if self.resolve_class(name, span, diags).is_none() {
                        diags.restore(mark);
                    }
                }
                None
            }
        };

        if let Some(class) = effective {
            if class.is_abstract {
                diags.error(
                    DiagCode::ClassIsAbstract,
                    format!("class {} is abstract and cannot be instantiated", class.name),
                    start_span.clone(),
                );
                return Err(Abort);
            }
        }

        let mut object = match (effective, &indicated) {
            (Some(class), _) => Object::new(class.name.clone()),
            (None, Some((name, _))) => Object::new(name.clone()),
            (None, None) => Object::untyped(),
        };
        object.span = start_span;

        if let Some(class) = effective {
            self.run_hooks(class, &mut object, diags, true)?;
        }

        self.expect(TokenKind::LBrace, diags)?;
        let mut assigned: HashSet<String> = HashSet::new();
        loop {
            if self.peek().kind == TokenKind::RBrace {
                self.advance();
                break;
            }
            let (name, name_span) = self.expect_name(diags)?;
            self.expect(TokenKind::Equals, diags)?;

            let property_ty = effective
                .and_then(|class| class.effective_properties().get(&name))
                .map(|property| property.ty.clone());
            match property_ty {
                Some(ty) => {
                    let duplicate = assigned.contains(&name);
                    if duplicate {
                        diags.error(
                            DiagCode::DuplicatePropertyName,
                            format!("property \"{}\" is assigned more than once", name),
                            name_span,
                        );
                    }
                    // Parse either way so scanning continues; the first
                    // assignment wins.
                    let value = self.parse_value(Some(&ty), diags)?;
                    if !duplicate {
                        assigned.insert(name.clone());
                        if !value.is_null() {
                            object.properties.insert(name, value);
                        }
                    }
                }
                None => {
                    let value = self.parse_value(None, diags)?;
                    let table = if effective.is_some() {
                        &mut object.unknown
                    } else {
                        &mut object.properties
                    };
                    if table.contains_key(&name) {
                        diags.error(
                            DiagCode::DuplicatePropertyName,
                            format!("property \"{}\" is assigned more than once", name),
                            name_span,
                        );
                    } else {
                        table.insert(name, value);
                    }
                }
            }
            self.expect(TokenKind::Comma, diags)?;
        }

        if let Some(class) = effective {
            for (name, property) in class.effective_properties() {
                if !property.ty.nullable && !assigned.contains(name) {
                    diags.error(
                        DiagCode::PropertyMissing,
                        format!(
                            "required property \"{}\" of class {} is missing",
                            name, class.name
                        ),
                        object.span.clone(),
                    );
                }
            }
            self.run_hooks(class, &mut object, diags, false)?;
        }

        if pushed {
            self.alias_scopes.pop();
        }
        Ok(object)
    }

    /// Runs `on_loading` (`loading == true`) or `on_loaded` hooks
    /// base-to-derived. A hook returning `false` aborts.
    fn run_hooks(
        &self,
        class: &'a ClassType,
        object: &mut Object,
        diags: &mut Diagnostics,
        loading: bool,
    ) -> PResult<()> {
        let span = object.span.clone();
        for link in self.registry.base_chain(class) {
            let hook = if loading { link.on_loading } else { link.on_loaded };
            if let Some(hook) = hook {
                if !hook(object, diags, &span) {
                    return Err(Abort);
                }
            }
        }
        Ok(())
    }

    // ----- values ---------------------------------------------------------

    fn parse_value(
        &mut self,
        expected: Option<&LocalType>,
        diags: &mut Diagnostics,
    ) -> PResult<Value> {
        if let TokenKind::Name(name) = &self.peek().kind {
            if name == "null" {
                let span = self.advance().span;
                if let Some(ty) = expected {
                    if !ty.nullable {
                        diags.error(
                            DiagCode::NullNotAllowed,
                            "null is not allowed here",
                            span,
                        );
                    }
                }
                return Ok(Value::Null);
            }
        }
        match expected {
            Some(ty) => self.parse_typed_value(&ty.core, diags),
            None => self.parse_untyped_value(diags),
        }
    }

    fn parse_typed_value(&mut self, core: &CoreType, diags: &mut Diagnostics) -> PResult<Value> {
        match core {
            CoreType::Global(GlobalRef::Atom(kind)) => self.parse_atom_value(*kind, diags),
            CoreType::Global(GlobalRef::Named(name)) => {
                let registry = self.registry;
                match registry.lookup(name) {
                    Some(GlobalType::Class(_)) => {
                        let object = self.parse_class_value(Some(name), diags)?;
                        Ok(Value::Object(object))
                    }
                    Some(GlobalType::Enum(en)) => self.parse_enum_ref(Some(en), diags),
                    None => {
                        let token = self.peek();
                        diags.error(
                            DiagCode::InvalidGlobalTypeReference,
                            format!("declared type {} is not registered", name),
                            token.span.clone(),
                        );
                        Err(Abort)
                    }
                }
            }
            CoreType::List(item) => self.parse_collection(Some(item), false, diags),
            CoreType::Set(item) => self.parse_collection(Some(item), true, diags),
            CoreType::Map { key, value } => self.parse_map(Some(key), Some(value), diags),
        }
    }

    fn parse_atom_value(&mut self, kind: AtomKind, diags: &mut Diagnostics) -> PResult<Value> {
        let token = self.peek().clone();
        let text: String = match &token.kind {
            TokenKind::Str(text) => text.clone(),
            TokenKind::Number(text) => text.clone(),
            TokenKind::CharLit(c) => c.to_string(),
            TokenKind::Name(text) => text.clone(),
            _ => return Err(self.unexpected(&format!("a {} literal", kind.name()), diags)),
        };
        self.advance();
        let admissible = match kind {
            AtomKind::String
            | AtomKind::IgnoreCaseString
            | AtomKind::Binary
            | AtomKind::Guid
            | AtomKind::Duration
            | AtomKind::DateTime => matches!(token.kind, TokenKind::Str(_)),
            AtomKind::F32 | AtomKind::F64 => match &token.kind {
                TokenKind::Number(_) => true,
                // Quoted form is reserved for the numeric sentinels.
                TokenKind::Str(text) => matches!(text.as_str(), "INF" | "-INF" | "NaN"),
                _ => false,
            },
            AtomKind::Decimal
            | AtomKind::I8
            | AtomKind::I16
            | AtomKind::I32
            | AtomKind::I64
            | AtomKind::U8
            | AtomKind::U16
            | AtomKind::U32
            | AtomKind::U64 => matches!(token.kind, TokenKind::Number(_)),
            AtomKind::Bool => matches!(token.kind, TokenKind::Name(_)),
            AtomKind::Char => matches!(token.kind, TokenKind::CharLit(_)),
        };
        let parsed = if admissible { atom::parse(kind, &text) } else { None };
        match parsed {
            Some(value) => Ok(value),
            None => {
                diags.error(
                    DiagCode::InvalidAtomValue,
                    format!("\"{}\" is not a valid {} literal", text, kind.name()),
                    token.span,
                );
                Ok(Value::Null)
            }
        }
    }

    /// Parses `[alias ::] Name . Member`. With a declared enum the member is
    /// resolved to its underlying value; otherwise the reference is kept
    /// unresolved.
    fn parse_enum_ref(
        &mut self,
        declared: Option<&'a EnumType>,
        diags: &mut Diagnostics,
    ) -> PResult<Value> {
        let (first, _first_span) = self.expect_name(diags)?;
        let (type_name, type_span) = if self.peek().kind == TokenKind::ColonColon {
            self.advance();
            let (name, span) = self.expect_name(diags)?;
            match self.resolve_alias(&first) {
                Some(uri) => (FullName::new(uri, name), span),
                None => {
                    diags.error(
                        DiagCode::InvalidAliasReference,
                        format!("alias \"{}\" is not declared in any enclosing scope", first),
                        span,
                    );
                    return Err(Abort);
                }
            }
        } else {
            // Unqualified references resolve in the declared enum's
            // namespace; schema-less ones keep an empty URI.
            let uri = declared.map(|en| en.name.uri.clone()).unwrap_or_default();
            let span = self.peek().span.clone();
            (FullName::new(uri, first), span)
        };
        self.expect(TokenKind::Dot, diags)?;
        let (member, member_span) = self.expect_name(diags)?;

        let en = match declared {
            Some(en) => en,
            None => {
                return Ok(Value::UnresolvedEnum(UntypedEnumValue::new(
                    type_name, member,
                )))
            }
        };
        if type_name != en.name {
            let code = if self.registry.lookup(&type_name).is_some() {
                DiagCode::EnumNotEqualToTheDeclared
            } else {
                DiagCode::InvalidGlobalTypeReference
            };
            diags.error(
                code,
                format!("{} is not the declared enum {}", type_name, en.name),
                type_span,
            );
            return Ok(Value::Null);
        }
        match en.member(&member) {
            Some(value) => Ok(Value::Enum(EnumValue::new(en.name.clone(), value.clone()))),
            None => {
                diags.error(
                    DiagCode::InvalidEnumMemberName,
                    format!("enum {} has no member \"{}\"", en.name, member),
                    member_span,
                );
                Ok(Value::Null)
            }
        }
    }

    fn parse_collection(
        &mut self,
        item_ty: Option<&LocalType>,
        unique: bool,
        diags: &mut Diagnostics,
    ) -> PResult<Value> {
        self.expect(TokenKind::LBracket, diags)?;
        let mut items: Vec<Value> = Vec::new();
        loop {
            if self.peek().kind == TokenKind::RBracket {
                self.advance();
                break;
            }
            let item_span = self.peek().span.clone();
            let value = self.parse_value(item_ty, diags)?;
            if unique && items.contains(&value) {
                // The offending item is dropped; siblings still parse.
                diags.error(DiagCode::DuplicateSetItem, "duplicate set item", item_span);
            } else {
                items.push(value);
            }
            self.expect(TokenKind::Comma, diags)?;
        }
        Ok(if unique {
            Value::Set(items)
        } else {
            Value::List(items)
        })
    }

    fn parse_map(
        &mut self,
        key_ty: Option<&GlobalRef>,
        value_ty: Option<&LocalType>,
        diags: &mut Diagnostics,
    ) -> PResult<Value> {
        self.expect(TokenKind::HashBracket, diags)?;
        let key_local = key_ty.map(|key| LocalType {
            nullable: false,
            core: CoreType::Global(key.clone()),
        });
        let mut entries: Vec<(Value, Value)> = Vec::new();
        loop {
            if self.peek().kind == TokenKind::RBracket {
                self.advance();
                break;
            }
            let key_span = self.peek().span.clone();
            let key = self.parse_value(key_local.as_ref(), diags)?;
            self.expect(TokenKind::Equals, diags)?;
            let value = self.parse_value(value_ty, diags)?;
            if entries.iter().any(|(existing, _)| existing == &key) {
                diags.error(DiagCode::DuplicateMapKey, "duplicate map key", key_span);
            } else {
                entries.push((key, value));
            }
            self.expect(TokenKind::Comma, diags)?;
        }
        Ok(Value::Map(entries))
    }

    fn parse_untyped_value(&mut self, diags: &mut Diagnostics) -> PResult<Value> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Name(ref name) => match name.as_str() {
                "true" => {
                    self.advance();
                    Ok(Value::Bool(true))
                }
                "false" => {
                    self.advance();
                    Ok(Value::Bool(false))
                }
                _ => self.parse_enum_ref(None, diags),
            },
            TokenKind::Str(text) => {
                self.advance();
                Ok(Value::String(text))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Ok(Value::Char(c))
            }
            TokenKind::Number(ref text) => {
                self.advance();
                match untyped_number(text) {
                    Some(value) => Ok(value),
                    None => {
                        diags.error(
                            DiagCode::InvalidAtomValue,
                            format!("\"{}\" is not a valid number", text),
                            token.span,
                        );
                        Ok(Value::Null)
                    }
                }
            }
            TokenKind::LBrace | TokenKind::LParen | TokenKind::LAngle => {
                let object = self.parse_class_value(None, diags)?;
                Ok(Value::Object(object))
            }
            TokenKind::LBracket => self.parse_collection(None, false, diags),
            TokenKind::HashBracket => self.parse_map(None, None, diags),
            _ => Err(self.unexpected("a value", diags)),
        }
    }
}

/// Classifies schema-less numeric text: integral text becomes `Int` (or
/// `UInt` beyond the signed range), anything fractional or exponential
/// becomes `F64`.
fn untyped_number(text: &str) -> Option<Value> {
    if text.contains(['.', 'e', 'E']) {
        return text.parse::<f64>().ok().map(Value::F64);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::Int(i));
    }
    text.parse::<u64>().ok().map(Value::UInt)
}

use std::collections::HashMap;
use std::fmt::Debug;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::Context;
use crate::TemplateError;
use crate::TemplateResult;
use crate::Value;

/// Supplies values for the directives of a template.
///
/// `resolve` is called for `IF`, `ELIF`, and expansion directives with the
/// directive key, its parameters (`[[[key(a, b)]]]` gives `["a", "b"]`), and
/// the [`Context`] of the directive in the output line. Returning `Ok(None)`
/// means the key has no value: it is falsy in conditions and expands to
/// nothing.
///
/// `assign` receives the identifier and raw text of a `[[[SET name=value]]]`
/// directive. Assigned state lives in the resolver, so it is visible to any
/// later expansion that reuses the same resolver.
pub trait Resolver {
	fn resolve(
		&mut self,
		key: &str,
		params: &[String],
		context: &Context,
	) -> TemplateResult<Option<Value>>;

	fn assign(&mut self, identifier: &str, value: &str) -> TemplateResult<()>;
}

impl<R: Resolver + ?Sized> Resolver for &mut R {
	fn resolve(
		&mut self,
		key: &str,
		params: &[String],
		context: &Context,
	) -> TemplateResult<Option<Value>> {
		(**self).resolve(key, params, context)
	}

	fn assign(&mut self, identifier: &str, value: &str) -> TemplateResult<()> {
		(**self).assign(identifier, value)
	}
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
	fn resolve(
		&mut self,
		key: &str,
		params: &[String],
		context: &Context,
	) -> TemplateResult<Option<Value>> {
		(**self).resolve(key, params, context)
	}

	fn assign(&mut self, identifier: &str, value: &str) -> TemplateResult<()> {
		(**self).assign(identifier, value)
	}
}

/// Split directive content into its key and parameter list.
///
/// `name(a, b)` becomes `("name", ["a", "b"])` with each parameter trimmed.
/// Anything after the closing parenthesis is ignored.
pub fn split_key(text: &str) -> TemplateResult<(&str, Vec<String>)> {
	let Some(open) = text.find('(') else {
		return Ok((text, Vec::new()));
	};

	let Some(close) = text[open + 1..].find(')').map(|index| index + open + 1) else {
		return Err(TemplateError::UnclosedParameterList(text.to_string()));
	};

	let params = text[open + 1..close]
		.split(',')
		.map(|param| param.trim().to_string())
		.collect();

	Ok((&text[..open], params))
}

/// A resolver backed by a plain map. Looking up a key that isn't in the map
/// is an error, and `SET` stores its value as [`Value::Text`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct MapResolver(
	#[deref]
	#[deref_mut]
	HashMap<String, Value>,
);

impl MapResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	pub fn into_inner(self) -> HashMap<String, Value> {
		self.0
	}
}

impl From<HashMap<String, Value>> for MapResolver {
	fn from(values: HashMap<String, Value>) -> Self {
		Self(values)
	}
}

impl<K, V> FromIterator<(K, V)> for MapResolver
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

impl Resolver for MapResolver {
	fn resolve(
		&mut self,
		key: &str,
		_params: &[String],
		_context: &Context,
	) -> TemplateResult<Option<Value>> {
		self.0
			.get(key)
			.cloned()
			.map(Some)
			.ok_or_else(|| TemplateError::UnknownKey(key.to_string()))
	}

	fn assign(&mut self, identifier: &str, value: &str) -> TemplateResult<()> {
		self.0
			.insert(identifier.to_string(), Value::Text(value.to_string()));
		Ok(())
	}
}

pub type ResolveFn<'a> =
	Box<dyn FnMut(&str, &[String], &Context) -> TemplateResult<Option<Value>> + 'a>;
pub type AssignFn<'a> = Box<dyn FnMut(&str, &str) -> TemplateResult<()> + 'a>;

/// A resolver that delegates to caller supplied closures. Without an assign
/// closure `SET` directives are accepted and ignored.
pub struct FunctionResolver<'a> {
	resolve: ResolveFn<'a>,
	assign: Option<AssignFn<'a>>,
}

impl<'a> FunctionResolver<'a> {
	pub fn new(
		resolve: impl FnMut(&str, &[String], &Context) -> TemplateResult<Option<Value>> + 'a,
	) -> Self {
		Self {
			resolve: Box::new(resolve),
			assign: None,
		}
	}

	#[must_use]
	pub fn with_assign(
		mut self,
		assign: impl FnMut(&str, &str) -> TemplateResult<()> + 'a,
	) -> Self {
		self.assign = Some(Box::new(assign));
		self
	}
}

impl Debug for FunctionResolver<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FunctionResolver")
			.field("assign", &self.assign.is_some())
			.finish_non_exhaustive()
	}
}

impl Resolver for FunctionResolver<'_> {
	fn resolve(
		&mut self,
		key: &str,
		params: &[String],
		context: &Context,
	) -> TemplateResult<Option<Value>> {
		(self.resolve)(key, params, context)
	}

	fn assign(&mut self, identifier: &str, value: &str) -> TemplateResult<()> {
		match self.assign.as_mut() {
			Some(assign) => assign(identifier, value),
			None => Ok(()),
		}
	}
}

pub type MemberFn<'a> = Box<dyn FnMut(&[String], &Context) -> TemplateResult<Option<Value>> + 'a>;

/// A named member of a [`DynamicResolver`].
pub enum Member<'a> {
	/// Returned as-is whenever the member is resolved.
	Value(Value),
	/// Invoked with the directive parameters and the offset context.
	Callable(MemberFn<'a>),
}

impl Debug for Member<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Member::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Member::Callable(_) => f.write_str("Callable"),
		}
	}
}

/// A resolver built from named members, each either a stored value or a
/// bound callable.
///
/// The resolver carries its own base [`Context`]. Callables receive the
/// directive's context offset by that base, which lets a resolver that
/// renders a nested template line its output up with the outer template.
/// `SET` creates or replaces a value member.
#[derive(Debug, Default)]
pub struct DynamicResolver<'a> {
	context: Context,
	members: HashMap<String, Member<'a>>,
}

impl<'a> DynamicResolver<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_context(context: Context) -> Self {
		Self {
			context,
			members: HashMap::new(),
		}
	}

	pub fn context(&self) -> &Context {
		&self.context
	}

	/// Store a plain value member.
	pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
		self.members.insert(name.into(), Member::Value(value.into()));
		self
	}

	/// Bind a callable member.
	pub fn bind(
		&mut self,
		name: impl Into<String>,
		callable: impl FnMut(&[String], &Context) -> TemplateResult<Option<Value>> + 'a,
	) -> &mut Self {
		self.members
			.insert(name.into(), Member::Callable(Box::new(callable)));
		self
	}

	pub fn member(&self, name: &str) -> Option<&Member<'a>> {
		self.members.get(name)
	}
}

impl Resolver for DynamicResolver<'_> {
	fn resolve(
		&mut self,
		key: &str,
		params: &[String],
		context: &Context,
	) -> TemplateResult<Option<Value>> {
		let Self {
			context: base,
			members,
		} = self;

		match members.get_mut(key) {
			Some(Member::Callable(callable)) => callable(params, &context.offset_by(base)),
			Some(Member::Value(value)) => Ok(Some(value.clone())),
			None => Err(TemplateError::UnknownKey(key.to_string())),
		}
	}

	fn assign(&mut self, identifier: &str, value: &str) -> TemplateResult<()> {
		tracing::trace!(identifier, "assigning dynamic member");
		self.set_value(identifier, value);
		Ok(())
	}
}

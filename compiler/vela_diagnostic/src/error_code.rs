use std::fmt;

/// Diagnostic channel.
///
/// Resolution problems and type problems are accumulated separately:
/// type analysis still runs over partially resolved trees, and callers
/// assert against each channel independently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Channel {
    /// Name resolution and declaration-shape problems.
    Compilation,
    /// Static type problems.
    Type,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Compilation => write!(f, "compilation"),
            Channel::Type => write!(f, "type"),
        }
    }
}

/// Error codes reported by the resolver.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ResolverErrorCode {
    /// Identifier not bound by any enclosing scope.
    UnresolvedIdentifier,
    /// Two top-level declarations with the same name in one library.
    DuplicateTopLevelDeclaration,
    /// Two members with the same name in one type.
    DuplicateMember,
    /// Same argument name written twice in one argument list.
    DuplicateNamedArgument,
    /// Qualified name whose qualifier is not an import prefix in scope.
    NoSuchPrefix,
    /// `factory` on a method that is not a constructor of its type.
    DisallowedFactory,
    /// `new` applied to something that is not a constructor.
    ExpectedConstructor,
}

impl ResolverErrorCode {
    /// Stable code name, as asserted by tests and shown in output.
    pub fn as_str(self) -> &'static str {
        match self {
            ResolverErrorCode::UnresolvedIdentifier => "UNRESOLVED_IDENTIFIER",
            ResolverErrorCode::DuplicateTopLevelDeclaration => "DUPLICATE_TOP_LEVEL_DECLARATION",
            ResolverErrorCode::DuplicateMember => "DUPLICATE_MEMBER",
            ResolverErrorCode::DuplicateNamedArgument => "DUPLICATE_NAMED_ARGUMENT",
            ResolverErrorCode::NoSuchPrefix => "NO_SUCH_PREFIX",
            ResolverErrorCode::DisallowedFactory => "DISALLOWED_FACTORY",
            ResolverErrorCode::ExpectedConstructor => "EXPECTED_CONSTRUCTOR",
        }
    }
}

/// Error codes reported by the type analyzer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeErrorCode {
    /// Call supplies fewer positional arguments than required parameters.
    MissingArgument,
    /// Call supplies a positional argument with no parameter left to bind.
    ExtraArgument,
    /// Named argument matches no parameter name.
    NoSuchNamedParameter,
    /// Named argument binds a parameter that is already bound.
    DuplicateNamedArgument,
    /// Interface constructor parameter types differ from its default
    /// class constructor.
    DefaultConstructorTypes,
    /// Concrete class with inherited or declared unimplemented members.
    AbstractClassWithoutAbstractModifier,
    /// `new` on a class marked abstract.
    InstantiationOfAbstractClass,
    /// `new` on an abstract class routed through a factory constructor.
    InstantiationOfAbstractClassUsingFactory,
    /// `new` on a concrete class that still has unimplemented members.
    InstantiationOfClassWithUnimplementedMembers,
    /// Setter declared with a non-void return type.
    SetterReturnType,
    /// Call target is not callable.
    NotAMethod,
}

impl TypeErrorCode {
    /// Stable code name, as asserted by tests and shown in output.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeErrorCode::MissingArgument => "MISSING_ARGUMENT",
            TypeErrorCode::ExtraArgument => "EXTRA_ARGUMENT",
            TypeErrorCode::NoSuchNamedParameter => "NO_SUCH_NAMED_PARAMETER",
            TypeErrorCode::DuplicateNamedArgument => "DUPLICATE_NAMED_ARGUMENT",
            TypeErrorCode::DefaultConstructorTypes => "DEFAULT_CONSTRUCTOR_TYPES",
            TypeErrorCode::AbstractClassWithoutAbstractModifier => {
                "ABSTRACT_CLASS_WITHOUT_ABSTRACT_MODIFIER"
            }
            TypeErrorCode::InstantiationOfAbstractClass => "INSTANTIATION_OF_ABSTRACT_CLASS",
            TypeErrorCode::InstantiationOfAbstractClassUsingFactory => {
                "INSTANTIATION_OF_ABSTRACT_CLASS_USING_FACTORY"
            }
            TypeErrorCode::InstantiationOfClassWithUnimplementedMembers => {
                "INSTANTIATION_OF_CLASS_WITH_UNIMPLEMENTED_MEMBERS"
            }
            TypeErrorCode::SetterReturnType => "SETTER_RETURN_TYPE",
            TypeErrorCode::NotAMethod => "NOT_A_METHOD",
        }
    }
}

/// Any diagnostic code, tagged by the channel that produces it.
///
/// The same code name may exist in both channels (named-argument
/// duplication is reported by the resolver for a literal repeat and by
/// the type analyzer for a rebind of an already-filled parameter), so the
/// channel is part of the code's identity rather than derived from the
/// name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    Resolver(ResolverErrorCode),
    Type(TypeErrorCode),
}

impl ErrorCode {
    /// Channel the code belongs to.
    pub fn channel(self) -> Channel {
        match self {
            ErrorCode::Resolver(_) => Channel::Compilation,
            ErrorCode::Type(_) => Channel::Type,
        }
    }

    /// Stable code name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Resolver(code) => code.as_str(),
            ErrorCode::Type(code) => code.as_str(),
        }
    }
}

impl From<ResolverErrorCode> for ErrorCode {
    fn from(code: ResolverErrorCode) -> Self {
        ErrorCode::Resolver(code)
    }
}

impl From<TypeErrorCode> for ErrorCode {
    fn from(code: TypeErrorCode) -> Self {
        ErrorCode::Type(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn channel_follows_origin() {
        let resolver: ErrorCode = ResolverErrorCode::DuplicateNamedArgument.into();
        let typed: ErrorCode = TypeErrorCode::DuplicateNamedArgument.into();
        assert_eq!(resolver.channel(), Channel::Compilation);
        assert_eq!(typed.channel(), Channel::Type);
        assert_eq!(resolver.as_str(), typed.as_str());
        assert_ne!(resolver, typed);
    }

    #[test]
    fn code_names_are_screaming_snake() {
        assert_eq!(
            ErrorCode::from(TypeErrorCode::AbstractClassWithoutAbstractModifier).to_string(),
            "ABSTRACT_CLASS_WITHOUT_ABSTRACT_MODIFIER"
        );
    }
}

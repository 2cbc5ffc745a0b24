//! Output type inference for executors

use super::definition::{DeclaredOutput, ExecutorSpec, TypeDescriptor, TypeRef};

/// Resolve the output type an executor produces.
///
/// An explicit `declared_output` wins. Otherwise the implementation's
/// type hierarchy is walked via [`infer_output_type`].
pub fn resolve_output_type(spec: &ExecutorSpec) -> Option<TypeRef> {
    match spec.declared_output {
        Some(DeclaredOutput::Typed(ref ty)) => Some(ty.clone()),
        Some(DeclaredOutput::Void) => None,
        None => infer_output_type(&spec.implementation),
    }
}

/// Walk from the concrete type upward to the first `Executor` specialization.
///
/// `Executor<In, Out>` yields `Out`; `Executor<In>` is void and yields `None`.
/// Specializations with any other arity are skipped. No match yields `None`.
pub fn infer_output_type(implementation: &TypeDescriptor) -> Option<TypeRef> {
    for ty in implementation.ancestry() {
        let Some(ref generic) = ty.generic else {
            continue;
        };
        if !generic.is_executor_family() {
            continue;
        }
        match generic.args.as_slice() {
            [_, output] => return Some(output.clone()),
            [_] => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(args: &[&str]) -> TypeDescriptor {
        let args = args.iter().map(|a| TypeRef::from(*a)).collect();
        TypeDescriptor::specialization("Executor", args)
    }

    #[test]
    fn test_two_args_yields_second() {
        let ty = TypeDescriptor::new("Doubler", "app").with_base(executor(&["i64", "i64"]));
        assert_eq!(infer_output_type(&ty), Some(TypeRef::new("i64")));
    }

    #[test]
    fn test_one_arg_is_void() {
        let ty = TypeDescriptor::new("Sink", "app").with_base(executor(&["String"]));
        assert_eq!(infer_output_type(&ty), None);
    }

    #[test]
    fn test_closest_match_wins() {
        // Derived -> Executor<A, B> -> Executor<A>
        let ty = TypeDescriptor::new("Derived", "app")
            .with_base(executor(&["A", "B"]).with_base(executor(&["A"])));
        assert_eq!(infer_output_type(&ty), Some(TypeRef::new("B")));

        // Derived -> Executor<A> -> Executor<A, B>
        let ty = TypeDescriptor::new("Derived", "app")
            .with_base(executor(&["A"]).with_base(executor(&["A", "B"])));
        assert_eq!(infer_output_type(&ty), None);
    }

    #[test]
    fn test_qualified_definition_stops_the_walk() {
        // Derived -> core::Executor<core::In> -> Executor<A, B>
        let void =
            TypeDescriptor::specialization("core::Executor<core::In>", vec!["core::In".into()]);
        let ty = TypeDescriptor::new("Derived", "app")
            .with_base(void.with_base(executor(&["A", "B"])));
        assert_eq!(infer_output_type(&ty), None);
    }

    #[test]
    fn test_concrete_specialization() {
        assert_eq!(
            infer_output_type(&executor(&["In", "Out"])),
            Some(TypeRef::new("Out"))
        );
    }

    #[test]
    fn test_non_executor_generics_are_skipped() {
        let ty = TypeDescriptor::new("Wrapper", "app").with_base(
            TypeDescriptor::specialization("Handler", vec!["X".into(), "Y".into()])
                .with_base(executor(&["X", "Z"])),
        );
        assert_eq!(infer_output_type(&ty), Some(TypeRef::new("Z")));
    }

    #[test]
    fn test_unexpected_arity_keeps_walking() {
        let ty = TypeDescriptor::new("Odd", "app").with_base(
            executor(&["A", "B", "C"]).with_base(executor(&["A", "D"])),
        );
        assert_eq!(infer_output_type(&ty), Some(TypeRef::new("D")));
    }

    #[test]
    fn test_no_executor_in_hierarchy() {
        let ty =
            TypeDescriptor::new("Plain", "app").with_base(TypeDescriptor::new("Object", "std"));
        assert_eq!(infer_output_type(&ty), None);
    }

    #[test]
    fn test_declared_output_wins() {
        let ty = TypeDescriptor::new("Doubler", "app").with_base(executor(&["i64", "i64"]));

        let typed =
            ExecutorSpec::new(ty.clone()).with_output(DeclaredOutput::Typed("u8".into()));
        assert_eq!(resolve_output_type(&typed), Some(TypeRef::new("u8")));

        let void = ExecutorSpec::new(ty.clone()).with_output(DeclaredOutput::Void);
        assert_eq!(resolve_output_type(&void), None);

        assert_eq!(
            resolve_output_type(&ExecutorSpec::new(ty)),
            Some(TypeRef::new("i64"))
        );
    }
}

//! Constructor selection.
//!
//! A constructor is a candidate when every required parameter has a plan
//! entry that supplies a value. Among candidates the one using the most
//! resolved parameters wins; ties go to the earliest declared. Once chosen,
//! resolved entries for mutable properties the constructor does not take are
//! scheduled as post-construction assignments. Every conversion failure in
//! the plans that did not block construction is reported as unresolved.

use mg_core::{
    AssignmentPhase, ConstructorDescriptor, ConstructorSignature, FxHashSet, PropertyDescriptor,
    PropertyMappingPlan, Resolution, TypeDescriptor, TypeRef, UnresolvedProperty,
    UnresolvedReason,
};
use tracing::{debug, warn};

use crate::error::{BlockedProperty, Blocker, MappingError};

/// The chosen constructor and the ordered assignments for a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Declaration index of the chosen constructor.
    pub index: usize,
    /// Signature of the chosen constructor.
    pub signature: ConstructorSignature,
    /// Constructor arguments in parameter order, then post-construction
    /// assignments in property declaration order.
    pub properties: Vec<PropertyMappingPlan>,
    /// Matched properties whose conversion failed without blocking
    /// construction, including slots of constructors that were not chosen.
    pub unresolved: Vec<UnresolvedProperty>,
}

/// Chooses a constructor of `target` for the resolved `plans`.
///
/// When `explicit` is given, only the constructor with exactly that
/// parameter-type signature is considered.
///
/// # Errors
///
/// - [`MappingError::UnknownConstructor`] if `explicit` matches no constructor
/// - [`MappingError::ExplicitConstructorNotSatisfiable`] if the pinned
///   constructor has blocked required parameters
/// - [`MappingError::NoMatchingConstructor`] if no constructor qualifies
pub fn select_constructor(
    target: &TypeDescriptor,
    plans: &[PropertyMappingPlan],
    explicit: Option<&ConstructorSignature>,
) -> Result<Selection, MappingError> {
    let index = match explicit {
        Some(signature) => select_explicit(target, plans, signature)?,
        None => select_best(target, plans)?,
    };

    let Some(constructor) = target.constructors.get(index) else {
        return Err(no_matching(target, plans));
    };
    debug!(
        target_type = %target.name,
        index,
        signature = %constructor.signature(),
        "Selected constructor"
    );

    Ok(assemble(target, constructor, index, plans))
}

fn select_explicit(
    target: &TypeDescriptor,
    plans: &[PropertyMappingPlan],
    signature: &ConstructorSignature,
) -> Result<usize, MappingError> {
    let Some(index) = target
        .constructors
        .iter()
        .position(|c| c.signature() == *signature)
    else {
        return Err(MappingError::UnknownConstructor {
            signature: signature.clone(),
            available: target
                .constructors
                .iter()
                .map(ConstructorDescriptor::signature)
                .collect(),
        });
    };

    let unsatisfied = blocked_parameters(&target.constructors[index], plans);
    if unsatisfied.is_empty() {
        Ok(index)
    } else {
        Err(MappingError::ExplicitConstructorNotSatisfiable {
            signature: signature.clone(),
            unsatisfied,
        })
    }
}

fn select_best(target: &TypeDescriptor, plans: &[PropertyMappingPlan]) -> Result<usize, MappingError> {
    let mut best: Option<(usize, usize)> = None;

    for (index, constructor) in target.constructors.iter().enumerate() {
        if !blocked_parameters(constructor, plans).is_empty() {
            continue;
        }
        let score = constructor
            .parameters
            .iter()
            .filter(|p| find_plan(plans, p).is_some_and(PropertyMappingPlan::is_resolved))
            .count();
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }

    best.map(|(index, _)| index)
        .ok_or_else(|| no_matching(target, plans))
}

fn no_matching(target: &TypeDescriptor, plans: &[PropertyMappingPlan]) -> MappingError {
    let mut seen = FxHashSet::default();
    let blocking = target
        .constructors
        .iter()
        .flat_map(|c| blocked_parameters(c, plans))
        .filter(|b| seen.insert((b.name.clone(), b.ty.clone())))
        .collect();

    MappingError::NoMatchingConstructor {
        target_type: target.name.clone(),
        blocking,
    }
}

fn find_plan<'p>(
    plans: &'p [PropertyMappingPlan],
    parameter: &PropertyDescriptor,
) -> Option<&'p PropertyMappingPlan> {
    plans
        .iter()
        .find(|p| p.target == parameter.name && p.target_type == parameter.ty)
}

fn blocked_parameters(
    constructor: &ConstructorDescriptor,
    plans: &[PropertyMappingPlan],
) -> Vec<BlockedProperty> {
    constructor
        .required_parameters()
        .filter_map(|param| {
            let cause = match find_plan(plans, param).map(|p| &p.resolution) {
                Some(Resolution::Ignored) => Blocker::Ignored,
                Some(Resolution::Unresolved { reason, .. }) => Blocker::Unresolved(reason.clone()),
                Some(_) => return None,
                None => Blocker::Unresolved(UnresolvedReason::Unmatched),
            };
            Some(BlockedProperty {
                name: param.name.clone(),
                ty: param.ty.clone(),
                cause,
            })
        })
        .collect()
}

fn assemble(
    target: &TypeDescriptor,
    constructor: &ConstructorDescriptor,
    index: usize,
    plans: &[PropertyMappingPlan],
) -> Selection {
    let mut properties = Vec::new();
    let mut unresolved = Vec::new();

    let mut take = |plan: &PropertyMappingPlan, phase: AssignmentPhase| {
        if plan.is_resolved() {
            properties.push(PropertyMappingPlan {
                phase,
                ..plan.clone()
            });
        } else if let Some(reason) = plan
            .unresolved_reason()
            .filter(|reason| reason.is_conversion_failure())
        {
            warn!(
                target_type = %target.name,
                property = %plan.target,
                %reason,
                "Property left unpopulated"
            );
            unresolved.push(UnresolvedProperty {
                name: plan.target.clone(),
                ty: plan.target_type.clone(),
                reason: reason.clone(),
            });
        }
    };

    for param in &constructor.parameters {
        if let Some(plan) = find_plan(plans, param) {
            take(plan, AssignmentPhase::Constructor);
        }
    }

    let consumed: FxHashSet<&str> = constructor
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    for property in target
        .properties
        .iter()
        .filter(|p| p.mutable && !consumed.contains(p.name.as_str()))
    {
        if let Some(plan) = find_plan(plans, property) {
            take(plan, AssignmentPhase::PostConstruction);
        }
    }

    // Conversion failures on slots the chosen constructor does not use.
    let listed: FxHashSet<(String, TypeRef)> = unresolved
        .iter()
        .map(|u| (u.name.clone(), u.ty.clone()))
        .collect();
    for plan in plans {
        if listed.contains(&(plan.target.clone(), plan.target_type.clone())) {
            continue;
        }
        if let Some(reason) = plan
            .unresolved_reason()
            .filter(|reason| reason.is_conversion_failure())
        {
            warn!(
                target_type = %target.name,
                property = %plan.target,
                %reason,
                "Property unresolved outside the chosen constructor"
            );
            unresolved.push(UnresolvedProperty {
                name: plan.target.clone(),
                ty: plan.target_type.clone(),
                reason: reason.clone(),
            });
        }
    }

    Selection {
        index,
        signature: constructor.signature(),
        properties,
        unresolved,
    }
}

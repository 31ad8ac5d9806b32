//! Calldata encoding for interactor calls.

use alloy_dyn_abi::{DynSolType, DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;

use crate::contract::IDefiInteractor;
use crate::domain::RoleId;
use crate::proposal::error::{ProposalError, ProposalResult};
use crate::proposal::TransactionRequest;

/// ABI-encode a typed call, selector included.
pub fn encode_call<C: SolCall>(call: &C) -> Bytes {
    Bytes::from(call.abi_encode())
}

/// Encode a call to `name` from string arguments.
///
/// The overload is picked by argument count. Each argument is coerced into
/// its parameter type the way `cast calldata` does.
pub fn encode_function_call<S: AsRef<str>>(
    abi: &JsonAbi,
    name: &str,
    args: &[S],
) -> ProposalResult<Bytes> {
    let overloads = abi
        .function(name)
        .ok_or_else(|| ProposalError::UnknownFunction(name.to_string()))?;

    let func = overloads
        .iter()
        .find(|f| f.inputs.len() == args.len())
        .ok_or_else(|| ProposalError::ArgumentCount {
            name: name.to_string(),
            expected: overloads
                .iter()
                .map(|f| f.inputs.len().to_string())
                .collect::<Vec<_>>()
                .join(" or "),
            got: args.len(),
        })?;

    let encoding_error = |reason: String| ProposalError::Encoding {
        name: name.to_string(),
        reason,
    };

    let values = func
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = DynSolType::parse(&param.selector_type())
                .map_err(|e| encoding_error(e.to_string()))?;
            ty.coerce_str(arg.as_ref())
                .map_err(|e| encoding_error(format!("argument `{}`: {e}", param.name)))
        })
        .collect::<ProposalResult<Vec<DynSolValue>>>()?;

    let data = func
        .abi_encode_input(&values)
        .map_err(|e| encoding_error(e.to_string()))?;
    Ok(Bytes::from(data))
}

pub fn grant_role(interactor: Address, member: Address, role: RoleId) -> TransactionRequest {
    TransactionRequest::call(
        interactor,
        encode_call(&IDefiInteractor::grantRoleCall {
            member,
            roleId: role.as_u16(),
        }),
    )
}

pub fn revoke_role(interactor: Address, member: Address, role: RoleId) -> TransactionRequest {
    TransactionRequest::call(
        interactor,
        encode_call(&IDefiInteractor::revokeRoleCall {
            member,
            roleId: role.as_u16(),
        }),
    )
}

pub fn pause(interactor: Address) -> TransactionRequest {
    TransactionRequest::call(interactor, encode_call(&IDefiInteractor::pauseCall {}))
}

pub fn unpause(interactor: Address) -> TransactionRequest {
    TransactionRequest::call(interactor, encode_call(&IDefiInteractor::unpauseCall {}))
}

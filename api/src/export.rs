//! Verifier export: a JSON description of a verification key, and a
//! Solidity contract checking proofs against it with the EVM precompiles.
use crate::errors::{Result, ZkError};
use crate::scheme::Engine;
use num_bigint::BigUint;
use serde_json::json;
use std::{fmt, str::FromStr};
use zkinfer_algebra::bn254::{BN254G1, BN254G2};
use zkinfer_groth16::VerifyingKey;

/// The output formats of `export_verifier`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// The verification key as JSON, coordinates in decimal.
    #[default]
    Json,
    /// A self-contained Solidity verifier contract.
    Solidity,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Json => "json",
            ExportFormat::Solidity => "solidity",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "solidity" | "sol" => Ok(ExportFormat::Solidity),
            _ => Err(ZkError::UnknownExportFormat(s.to_string())),
        }
    }
}

fn g1_strings(p: &BN254G1) -> [String; 2] {
    let (x, y) = p.to_affine_coordinates();
    [x.to_string(), y.to_string()]
}

/// `[[x.c0, x.c1], [y.c0, y.c1]]`.
fn g2_strings(p: &BN254G2) -> [[String; 2]; 2] {
    let (x, y) = p.to_affine_coordinates();
    let s = |v: &[BigUint; 2]| [v[0].to_string(), v[1].to_string()];
    [s(&x), s(&y)]
}

/// Describe a Groth16 verification key as pretty-printed JSON.
pub fn groth16_json(vk: &VerifyingKey<Engine>) -> Result<String> {
    let ic: Vec<[String; 2]> = vk.gamma_abc_g1().iter().map(g1_strings).collect();
    let value = json!({
        "protocol": "groth16",
        "curve": "bn254",
        "fingerprint": vk.fingerprint().to_hex(),
        "num_public": vk.num_public(),
        "alpha_g1": g1_strings(vk.alpha_g1()),
        "beta_g2": g2_strings(vk.beta_g2()),
        "gamma_g2": g2_strings(vk.gamma_g2()),
        "delta_g2": g2_strings(vk.delta_g2()),
        "ic": ic,
    });
    serde_json::to_string_pretty(&value).map_err(|e| ZkError::SerializationError(e.to_string()))
}

fn g1_literal(p: &BN254G1) -> String {
    let [x, y] = g1_strings(p);
    format!("G1Point({}, {})", x, y)
}

/// The EVM precompile expects the imaginary part of each coordinate first.
fn g2_literal(p: &BN254G2) -> String {
    let [[x0, x1], [y0, y1]] = g2_strings(p);
    format!("G2Point([{}, {}], [{}, {}])", x1, x0, y1, y0)
}

/// Render a Solidity contract that verifies Groth16 proofs for `vk`.
pub fn groth16_solidity(vk: &VerifyingKey<Engine>) -> String {
    let ic = vk.gamma_abc_g1();
    let ic_lines: Vec<String> = ic
        .iter()
        .enumerate()
        .map(|(i, p)| format!("        ic[{}] = {};", i, g1_literal(p)))
        .collect();
    SOLIDITY_TEMPLATE
        .replace("<%fingerprint%>", &vk.fingerprint().to_hex())
        .replace("<%num_public%>", &vk.num_public().to_string())
        .replace("<%ic_len%>", &ic.len().to_string())
        .replace("<%alpha%>", &g1_literal(vk.alpha_g1()))
        .replace("<%beta%>", &g2_literal(vk.beta_g2()))
        .replace("<%gamma%>", &g2_literal(vk.gamma_g2()))
        .replace("<%delta%>", &g2_literal(vk.delta_g2()))
        .replace("<%ic%>", &ic_lines.join("\n"))
}

const SOLIDITY_TEMPLATE: &str = r#"// SPDX-License-Identifier: MIT
// Groth16 verifier for zkinfer circuit <%fingerprint%>.
pragma solidity ^0.8.0;

contract Groth16Verifier {
    uint256 constant SCALAR_FIELD =
        21888242871839275222246405745257275088548364400416034343698204186575808495617;
    uint256 constant BASE_FIELD =
        21888242871839275222246405745257275088696311157297823662689037894645226208583;
    uint256 constant NUM_PUBLIC = <%num_public%>;

    struct G1Point {
        uint256 X;
        uint256 Y;
    }

    // Coordinates are (imaginary, real).
    struct G2Point {
        uint256[2] X;
        uint256[2] Y;
    }

    function negate(G1Point memory p) internal pure returns (G1Point memory) {
        if (p.X == 0 && p.Y == 0) {
            return G1Point(0, 0);
        }
        return G1Point(p.X, BASE_FIELD - (p.Y % BASE_FIELD));
    }

    function add(G1Point memory p1, G1Point memory p2) internal view returns (G1Point memory r) {
        uint256[4] memory input = [p1.X, p1.Y, p2.X, p2.Y];
        bool success;
        assembly {
            success := staticcall(gas(), 6, input, 0x80, r, 0x40)
        }
        require(success, "ec-add-failed");
    }

    function mul(G1Point memory p, uint256 s) internal view returns (G1Point memory r) {
        uint256[3] memory input = [p.X, p.Y, s];
        bool success;
        assembly {
            success := staticcall(gas(), 7, input, 0x60, r, 0x40)
        }
        require(success, "ec-mul-failed");
    }

    function pairing(G1Point[4] memory p1, G2Point[4] memory p2) internal view returns (bool) {
        uint256[24] memory input;
        for (uint256 i = 0; i < 4; i++) {
            input[i * 6 + 0] = p1[i].X;
            input[i * 6 + 1] = p1[i].Y;
            input[i * 6 + 2] = p2[i].X[0];
            input[i * 6 + 3] = p2[i].X[1];
            input[i * 6 + 4] = p2[i].Y[0];
            input[i * 6 + 5] = p2[i].Y[1];
        }
        uint256[1] memory out;
        bool success;
        assembly {
            success := staticcall(gas(), 8, input, 768, out, 0x20)
        }
        require(success, "pairing-failed");
        return out[0] != 0;
    }

    function verifyingKey()
        internal
        pure
        returns (
            G1Point memory alpha,
            G2Point memory beta,
            G2Point memory gamma,
            G2Point memory delta,
            G1Point[] memory ic
        )
    {
        alpha = <%alpha%>;
        beta = <%beta%>;
        gamma = <%gamma%>;
        delta = <%delta%>;
        ic = new G1Point[](<%ic_len%>);
<%ic%>
    }

    /// `b` is given as [[x.im, x.re], [y.im, y.re]].
    function verifyProof(
        uint256[2] calldata a,
        uint256[2][2] calldata b,
        uint256[2] calldata c,
        uint256[] calldata input
    ) external view returns (bool) {
        require(input.length == NUM_PUBLIC, "bad-input-length");
        (
            G1Point memory alpha,
            G2Point memory beta,
            G2Point memory gamma,
            G2Point memory delta,
            G1Point[] memory ic
        ) = verifyingKey();

        G1Point memory acc = ic[0];
        for (uint256 i = 0; i < input.length; i++) {
            require(input[i] < SCALAR_FIELD, "input-not-in-field");
            acc = add(acc, mul(ic[i + 1], input[i]));
        }

        // e(-A, B) * e(alpha, beta) * e(acc, gamma) * e(C, delta) == 1
        G1Point[4] memory p1 = [negate(G1Point(a[0], a[1])), alpha, acc, G1Point(c[0], c[1])];
        G2Point[4] memory p2 = [G2Point(b[0], b[1]), beta, gamma, delta];
        return pairing(p1, p2);
    }
}
"#;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_parse() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("sol".parse::<ExportFormat>().unwrap(), ExportFormat::Solidity);
        assert_eq!(
            ExportFormat::Solidity.to_string().parse::<ExportFormat>().unwrap(),
            ExportFormat::Solidity
        );
        assert!(matches!(
            "vyper".parse::<ExportFormat>(),
            Err(ZkError::UnknownExportFormat(_))
        ));
    }
}

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::validation::{Schema, Validator, Violation};

const ORDER_FIELDS: &[&str] = &[
    "id",
    "customerId",
    "orderDate",
    "items",
    "totalAmount",
    "currency",
];

const ITEM_FIELDS: &[&str] = &[
    "productId",
    "productName",
    "quantity",
    "unitPrice",
    "totalPrice",
];

/// An order pushed by an external system. Amounts stay as the json numbers
/// they arrived as.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIngestionPayload {
    pub id: String,
    pub customer_id: String,
    pub order_date: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Number,
    pub currency: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Number,
    pub total_price: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn amount(v: &mut Validator<'_>, key: &str) -> Option<Number> {
    let number = v.number(key);
    v.min_number(key, number.as_ref().and_then(Number::as_f64), 0.0);
    number
}

fn parse_item(mut v: Validator<'_>) -> (Option<OrderItem>, Validator<'_>) {
    let product_id = v.string("productId");
    let product_name = v.string("productName");
    let quantity = v.integer("quantity");
    v.min_number("quantity", quantity.map(|q| q as f64), 1.0);
    let unit_price = amount(&mut v, "unitPrice");
    let total_price = amount(&mut v, "totalPrice");

    let item = match (product_id, product_name, quantity, unit_price, total_price) {
        (
            Some(product_id),
            Some(product_name),
            Some(quantity),
            Some(unit_price),
            Some(total_price),
        ) => Some(OrderItem {
            product_id,
            product_name,
            quantity,
            unit_price,
            total_price,
            extra: v.extras(ITEM_FIELDS),
        }),
        _ => None,
    };

    (item, v)
}

impl Schema for OrderIngestionPayload {
    fn parse(value: &Value) -> Result<OrderIngestionPayload, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let id = v.string("id");
        let customer_id = v.string("customerId");
        let order_date = v.string("orderDate");
        v.datetime("orderDate", order_date.as_deref());

        let elements = v.array("items");
        v.min_elements("items", elements, 1);
        let mut items = Vec::new();
        for (index, element) in elements.into_iter().flatten().enumerate() {
            if let Some(iv) = v.element("items", index, element) {
                let (item, iv) = parse_item(iv);
                v.absorb(iv);
                items.extend(item);
            }
        }

        let total_amount = amount(&mut v, "totalAmount");
        let currency = v.string("currency");
        v.min_chars(
            "currency",
            currency.as_deref(),
            1,
            "String must contain at least 1 character(s)",
        );
        let extra = v.extras(ORDER_FIELDS);

        v.finish(OrderIngestionPayload {
            id: id.unwrap_or_default(),
            customer_id: customer_id.unwrap_or_default(),
            order_date: order_date.unwrap_or_default(),
            items,
            total_amount: total_amount.unwrap_or_else(|| Number::from(0)),
            currency: currency.unwrap_or_default(),
            extra,
        })
    }
}
